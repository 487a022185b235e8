mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

const SIGNATURE: &str = "data:image/png;base64,aGVsbG8=";

#[tokio::test]
async fn test_bid_flow_end_to_end() {
    let state = test_state();
    let app = create_test_app(&state);

    let (poster, _) = register(&app, "dispatch@haulage-a.co.uk", "company", "Haulage A").await;
    let (carrier, _) = register(&app, "ops@carrier-b.co.uk", "broker", "Carrier B").await;

    let response = post(&app, "/api/jobs", Some(&poster), job_payload(500)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_body(response).await;
    assert_eq!(body["data"]["status"], "open");
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = post(
        &app,
        &format!("/api/jobs/{}/bids", job_id),
        Some(&carrier),
        json!({ "amount": 450, "message": "Can collect tomorrow" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_body(response).await;
    assert_eq!(body["data"]["status"], "submitted");
    let bid_id = body["data"]["id"].as_str().unwrap().to_string();

    // Segunda puja de la misma empresa
    let response = post(&app, &format!("/api/jobs/{}/bids", job_id), Some(&carrier), json!({ "amount": 440 })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("already bid"));

    // El transportista no puede aceptar su propia puja
    let response = post(&app, &format!("/api/bids/{}/accept", bid_id), Some(&carrier), json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post(&app, &format!("/api/bids/{}/accept", bid_id), Some(&poster), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_body(response).await;
    assert_eq!(body["data"]["bid"]["status"], "accepted");
    assert_eq!(body["data"]["job"]["status"], "assigned");

    let response = get(&app, &format!("/api/jobs/{}", job_id), Some(&carrier)).await;
    let body = extract_body(response).await;
    assert_eq!(body["data"]["status"], "assigned");
    assert_eq!(body["data"]["agreed_rate"], "450");

    let response = get(&app, "/api/bids/mine", Some(&carrier)).await;
    let body = extract_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bid_on_own_job_is_forbidden() {
    let state = test_state();
    let app = create_test_app(&state);
    let (poster, _) = register(&app, "solo@haulage.co.uk", "company", "Solo Haulage").await;

    let body = extract_body(post(&app, "/api/jobs", Some(&poster), job_payload(300)).await).await;
    let job_id = body["data"]["id"].as_str().unwrap();

    let response = post(&app, &format!("/api/jobs/{}/bids", job_id), Some(&poster), json!({ "amount": 250 })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_draft_job_is_not_on_board_until_published() {
    let state = test_state();
    let app = create_test_app(&state);
    let (poster, _) = register(&app, "drafts@haulage.co.uk", "company", "Draft Haulage").await;

    let mut payload = job_payload(700);
    payload["draft"] = json!(true);
    let body = extract_body(post(&app, "/api/jobs", Some(&poster), payload).await).await;
    assert_eq!(body["data"]["status"], "draft");
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let board = extract_body(get(&app, "/api/board", None).await).await;
    assert!(board["data"].as_array().unwrap().is_empty());

    let response = post(&app, &format!("/api/jobs/{}/publish", job_id), Some(&poster), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let board = extract_body(get(&app, "/api/board", None).await).await;
    assert_eq!(board["data"].as_array().unwrap().len(), 1);

    // Origen y destino se filtran por separado
    let board = extract_body(get(&app, "/api/board?delivery=leeds", None).await).await;
    assert_eq!(board["data"].as_array().unwrap().len(), 1);
    let board = extract_body(get(&app, "/api/board?pickup=leeds", None).await).await;
    assert!(board["data"].as_array().unwrap().is_empty());

    // Publicar dos veces no es una transición válida
    let response = post(&app, &format!("/api/jobs/{}/publish", job_id), Some(&poster), json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delivery_requires_signature_and_recipient() {
    let state = test_state();
    let app = create_test_app(&state);

    let (poster, _) = register(&app, "shipper@haulage.co.uk", "company", "Shipper Ltd").await;
    let (driver, _) = register(&app, "driver@owner-op.co.uk", "driver", "Owner Op").await;

    let body = extract_body(post(&app, "/api/jobs", Some(&poster), job_payload(500)).await).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();

    let body = extract_body(post(&app, &format!("/api/jobs/{}/bids", job_id), Some(&driver), json!({ "amount": 480 })).await).await;
    let bid_id = body["data"]["id"].as_str().unwrap().to_string();
    let response = post(&app, &format!("/api/bids/{}/accept", bid_id), Some(&poster), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post(&app, &format!("/api/jobs/{}/pickup", job_id), Some(&driver), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_body(response).await["data"]["status"], "in_transit");

    let deliver_uri = format!("/api/jobs/{}/deliver", job_id);

    let response = post(&app, &deliver_uri, Some(&driver), json!({ "photos": [] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post(&app, &deliver_uri, Some(&driver), json!({ "recipient_name": "J. Smith" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post(&app, &deliver_uri, Some(&driver), json!({ "signature": SIGNATURE })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nada se ha movido tras los rechazos
    let body = extract_body(get(&app, &format!("/api/jobs/{}", job_id), Some(&driver)).await).await;
    assert_eq!(body["data"]["status"], "in_transit");
    assert!(body["data"]["delivered_at"].is_null());

    let response = post(
        &app,
        &deliver_uri,
        Some(&driver),
        json!({
            "recipient_name": "J. Smith",
            "signature": SIGNATURE,
            "photos": ["data:image/jpeg;base64,aGVsbG8="],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_body(response).await;
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["recipient_name"], "J. Smith");
    assert!(body["data"]["delivered_at"].is_string());
    assert!(body["data"]["signature_url"].is_string());
    assert_eq!(body["data"]["photo_urls"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delay_report_returns_chat_link() {
    let state = test_state();
    let app = create_test_app(&state);

    let (poster, _) = register(&app, "late@haulage.co.uk", "company", "Late Haulage").await;
    let (driver, _) = register(&app, "driver@late.co.uk", "driver", "Late Driver").await;

    let body = extract_body(post(&app, "/api/jobs", Some(&poster), job_payload(200)).await).await;
    let job_id = body["data"]["id"].as_str().unwrap().to_string();
    let body = extract_body(post(&app, &format!("/api/jobs/{}/bids", job_id), Some(&driver), json!({ "amount": 190 })).await).await;
    let bid_id = body["data"]["id"].as_str().unwrap().to_string();
    post(&app, &format!("/api/bids/{}/accept", bid_id), Some(&poster), json!({})).await;

    let response = post(
        &app,
        &format!("/api/jobs/{}/delay", job_id),
        Some(&driver),
        json!({ "reason": "Traffic on the M62", "eta_minutes": 45, "phone": "+44 7700 900123" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_body(response).await;
    let link = body["data"]["chat_link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/447700900123?text="));
}
