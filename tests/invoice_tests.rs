mod common;

use axum::http::{header, Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use freight_exchange::models::auth::Role;

use common::*;

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_preview_applies_vat_and_terms() {
    let state = test_state();
    let app = create_test_app(&state);
    let owner = staff_token(&app, &state, "owner@exchange.co.uk", Role::Owner).await;

    let response = post(
        &app,
        "/api/invoices/preview",
        Some(&owner),
        json!({ "net_amount": "1234.56", "vat_rate": 20, "payment_terms": "14 days", "issue_date": "2024-03-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_body(response).await;
    assert_eq!(decimal(&body["data"]["net_amount"]), Decimal::new(123456, 2));
    assert_eq!(decimal(&body["data"]["vat_amount"]), Decimal::new(24691, 2));
    assert_eq!(decimal(&body["data"]["gross_amount"]), Decimal::new(148147, 2));
    assert_eq!(body["data"]["due_date"], "2024-03-15");

    assert_eq!(body["data"]["vat_amount"], "246.91");

    let response = post(&app, "/api/invoices/preview", Some(&owner), json!({ "net_amount": 100, "vat_rate": 17 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post(&app, "/api/invoices/preview", Some(&owner), json!({ "net_amount": "10.025", "vat_rate": 20 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invoice_create_update_and_print() {
    let state = test_state();
    let app = create_test_app(&state);
    let admin = staff_token(&app, &state, "admin@exchange.co.uk", Role::Admin).await;

    let response = post(
        &app,
        "/api/invoices",
        Some(&admin),
        json!({
            "customer_name": "Acme <Logistics>",
            "customer_email": "accounts@acme.co.uk",
            "net_amount": 100,
            "vat_rate": 20,
            "payment_terms": "Pay now",
            "issue_date": "2024-06-01",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_body(response).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"]["invoice_number"].as_str().unwrap().starts_with("INV-20240601-"));
    assert_eq!(decimal(&body["data"]["gross_amount"]), Decimal::from(120));
    assert_eq!(body["data"]["due_date"], "2024-06-01");
    assert_eq!(body["data"]["payment_status"], "unpaid");

    // Cambiar solo el tipo de IVA no toca el neto
    let response = send(&app, Method::PUT, &format!("/api/invoices/{}", id), Some(&admin), Some(json!({ "vat_rate": 5 }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_body(response).await;
    assert_eq!(decimal(&body["data"]["net_amount"]), Decimal::from(100));
    assert_eq!(decimal(&body["data"]["gross_amount"]), Decimal::from(105));

    let response = get(&app, &format!("/api/invoices/{}/print", id), Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    let html = extract_text(response).await;
    assert!(html.contains("Acme &lt;Logistics&gt;"));
    assert!(html.contains("£105.00"));

    let body = extract_body(get(&app, "/api/invoices", Some(&admin)).await).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_company_roles_cannot_see_invoices() {
    let state = test_state();
    let app = create_test_app(&state);
    let (company, _) = register(&app, "accounts@fleet.co.uk", "company", "Fleet Co").await;

    let response = get(&app, "/api/invoices", Some(&company)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_csv_export_is_scoped_to_company() {
    let state = test_state();
    let app = create_test_app(&state);
    let (first, _) = register(&app, "one@fleet.co.uk", "company", "First Co").await;
    let (second, _) = register(&app, "two@fleet.co.uk", "company", "Second Co").await;

    post(&app, "/api/jobs", Some(&first), job_payload(500)).await;
    post(&app, "/api/jobs", Some(&first), job_payload(650)).await;
    post(&app, "/api/jobs", Some(&second), job_payload(900)).await;

    let response = get(&app, "/api/jobs/export", Some(&first)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"jobs-"));

    let csv = extract_text(response).await;
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("id,status,"));
    assert!(lines[1..].iter().all(|l| l.contains("\"Unit 4, Trafford Park\"")));
}
