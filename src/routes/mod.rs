pub mod admin_routes;
pub mod auth_routes;
pub mod bid_routes;
pub mod health_routes;
pub mod invoice_routes;
pub mod job_routes;
pub mod owner_routes;
pub mod portal_routes;

use axum::{middleware::from_fn_with_state, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::{cors_layer, rate_limit_middleware, require_store};
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    // Todo lo que toca el backing store responde 503 en modo no configurado
    let store_backed = Router::new()
        .merge(health_routes::create_board_router())
        .nest("/api/auth", auth_routes::create_auth_router())
        .nest("/api/jobs", job_routes::create_job_router(&state))
        .nest("/api/bids", bid_routes::create_bid_router(&state))
        .nest("/api/invoices", invoice_routes::create_invoice_router(&state))
        .nest("/api/owner", owner_routes::create_owner_router(&state))
        .nest("/api/admin", admin_routes::create_admin_router(&state))
        .nest("/api/portal", portal_routes::create_portal_router(&state))
        .layer(from_fn_with_state(state.clone(), require_store));

    Router::new()
        .merge(health_routes::create_public_router())
        .merge(store_backed)
        .layer(from_fn_with_state(state.rate_limit.clone(), rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
