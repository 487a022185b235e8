//! Middleware del sistema
//!
//! Este módulo contiene el extractor de autenticación, el guard de rol por
//! vista, el guard de backing store, CORS y rate limiting.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod role_gate;
pub mod store_guard;

pub use cors::cors_layer;
pub use rate_limit::{rate_limit_middleware, RateLimitState};
pub use role_gate::{gated, role_gate, ViewGate};
pub use store_guard::require_store;
