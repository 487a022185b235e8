use axum::{extract::State, routing::get, Json, Router};

use crate::controllers::analytics_controller::AnalyticsController;
use crate::dto::ApiResponse;
use crate::middleware::gated;
use crate::models::analytics::PlatformSummary;
use crate::services::access_policy::View;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Panel del owner
pub fn create_owner_router(state: &AppState) -> Router<AppState> {
    gated(state, View::OwnerAnalytics, Router::new().route("/analytics", get(analytics)))
}

async fn analytics(State(state): State<AppState>) -> Result<Json<ApiResponse<PlatformSummary>>, AppError> {
    let controller = AnalyticsController::new(&state)?;
    Ok(Json(controller.summary().await?))
}
