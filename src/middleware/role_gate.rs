//! Guard de rol por vista
//!
//! Un rol fuera de la lista de la vista nunca llega al handler: recibe un
//! `303 See Other` hacia la ubicación por defecto de su rol.

use axum::{
    extract::{FromRef, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use tracing::warn;

use crate::models::auth::AuthUser;
use crate::services::access_policy::{can_access, View};
use crate::state::AppState;

#[derive(Clone)]
pub struct ViewGate {
    pub state: AppState,
    pub view: View,
}

impl FromRef<ViewGate> for AppState {
    fn from_ref(gate: &ViewGate) -> AppState {
        gate.state.clone()
    }
}

pub async fn role_gate(State(gate): State<ViewGate>, user: AuthUser, mut request: Request, next: Next) -> Response {
    if !can_access(gate.view, user.role) {
        warn!(
            user_id = %user.user_id,
            role = %user.role,
            view = ?gate.view,
            "🚫 Acceso denegado, redirigiendo a {}",
            user.role.home_location()
        );
        return Redirect::to(user.role.home_location()).into_response();
    }

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Protege todas las rutas de `router` con la política de `view`
pub fn gated(state: &AppState, view: View, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        ViewGate {
            state: state.clone(),
            view,
        },
        role_gate,
    ))
}
