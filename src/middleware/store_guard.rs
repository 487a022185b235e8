use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::state::AppState;
use crate::utils::errors::AppError;

/// Sin backing store, las rutas que lo necesitan responden 503 sin tocar nada
pub async fn require_store(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.is_configured() {
        debug!("⛔ {} rechazado: backing store no configurado", request.uri().path());
        return AppError::NotConfigured.into_response();
    }
    next.run(request).await
}
