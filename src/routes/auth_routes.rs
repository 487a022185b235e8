use axum::{extract::State, routing::{get, post}, Json, Router};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::dto::ApiResponse;
use crate::models::auth::AuthUser;
use crate::models::profile::Profile;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let controller = AuthController::new(&state)?;
    Ok(Json(controller.register(request).await?))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let controller = AuthController::new(&state)?;
    Ok(Json(controller.login(request).await?))
}

async fn logout(State(state): State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AuthController::new(&state)?;
    Ok(Json(controller.logout(&user).await))
}

async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let controller = AuthController::new(&state)?;
    Ok(Json(controller.me(&user).await?))
}
