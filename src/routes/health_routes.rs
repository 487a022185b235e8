use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::business;
use crate::controllers::job_controller::JobController;
use crate::dto::ApiResponse;
use crate::models::job::Job;
use crate::services::job_query::JobQuery;
use crate::state::AppState;
use crate::utils::errors::AppError;

const NOT_CONFIGURED_BANNER: &str =
    "Backing store not configured: set DATABASE_URL or STORE_BACKEND=memory to enable the marketplace";

/// Rutas públicas sin backing store
pub fn create_public_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/config", get(config))
}

/// Bolsa pública de cargas
pub fn create_board_router() -> Router<AppState> {
    Router::new().route("/api/board", get(board))
}

fn banner(state: &AppState) -> Option<&'static str> {
    (!state.is_configured()).then_some(NOT_CONFIGURED_BANNER)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "configured": state.is_configured(),
        "banner": banner(&state),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "configured": state.is_configured(),
        "banner": banner(&state),
        "company": business::company_identity(),
        "payment_terms": business::payment_terms_labels(),
        "vat_rates": business::VAT_RATES,
        "default_vat_rate": business::DEFAULT_VAT_RATE,
        "vehicle_types": business::VEHICLE_TYPES,
        "job_statuses": business::job_status_labels(),
        "bid_statuses": business::bid_status_labels(),
        "board_refresh_secs": business::JOB_BOARD_REFRESH_SECS,
    }))
}

async fn board(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<ApiResponse<Vec<Job>>>, AppError> {
    let controller = JobController::new(&state)?;
    Ok(Json(controller.board(query).await?))
}
