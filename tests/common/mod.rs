#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use freight_exchange::clients::MemoryPhotoStorage;
use freight_exchange::config::EnvironmentConfig;
use freight_exchange::models::auth::Role;
use freight_exchange::models::profile::Profile;
use freight_exchange::repositories::ProfileRepository;
use freight_exchange::{create_router, AppState};

pub const PASSWORD: &str = "correct-horse-battery";

/// Estado en memoria con bcrypt barato para los tests
pub fn test_state() -> AppState {
    let config = EnvironmentConfig {
        bcrypt_cost: 4,
        rate_limit_requests: 10_000,
        ..EnvironmentConfig::default()
    };
    AppState::in_memory(config, MemoryPhotoStorage::new())
}

pub fn create_test_app(state: &AppState) -> Router {
    create_router(state.clone())
}

pub async fn extract_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn extract_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response {
    send(app, Method::POST, uri, token, Some(body)).await
}

/// Alta de una cuenta de empresa; devuelve (token, respuesta completa)
pub async fn register(app: &Router, email: &str, role: &str, company: &str) -> (String, Value) {
    let response = post(
        app,
        "/api/auth/register",
        None,
        json!({
            "email": email,
            "password": PASSWORD,
            "full_name": "Test User",
            "role": role,
            "company_name": company,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "register {}", email);
    let body = extract_body(response).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (token, body)
}

/// Admin y owner no se registran: se insertan directamente y se hace login
pub async fn staff_token(app: &Router, state: &AppState, email: &str, role: Role) -> String {
    let profile = Profile {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
        full_name: "Staff".to_string(),
        role,
        company_id: None,
        created_at: Utc::now(),
    };
    state.repos().unwrap().profiles.insert(profile).await.unwrap();

    let response = post(app, "/api/auth/login", None, json!({ "email": email, "password": PASSWORD })).await;
    assert_eq!(response.status(), StatusCode::OK);
    extract_body(response).await["data"]["token"].as_str().unwrap().to_string()
}

pub fn job_payload(budget: u32) -> Value {
    json!({
        "pickup_location": "Unit 4, Trafford Park",
        "pickup_postcode": "M17 1AB",
        "delivery_location": "Leeds Distribution Centre",
        "delivery_postcode": "LS1 4AP",
        "pickup_at": (Utc::now() + chrono::Duration::days(2)).to_rfc3339(),
        "budget": budget,
        "vehicle_type": "luton",
        "pallets": 4,
        "load_type": "regular",
    })
}
