use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::bid_controller::BidController;
use crate::dto::bid_dto::AcceptBidResponse;
use crate::dto::ApiResponse;
use crate::middleware::gated;
use crate::models::auth::AuthUser;
use crate::models::bid::Bid;
use crate::services::access_policy::View;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_bid_router(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/mine", get(list_mine))
        .route("/:id/accept", post(accept_bid))
        .route("/:id/reject", post(reject_bid))
        .route("/:id/withdraw", post(withdraw_bid));

    gated(state, View::Bidding, router)
}

async fn list_mine(State(state): State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<Vec<Bid>>>, AppError> {
    let controller = BidController::new(&state)?;
    Ok(Json(controller.list_mine(&user).await?))
}

async fn accept_bid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AcceptBidResponse>>, AppError> {
    let controller = BidController::new(&state)?;
    Ok(Json(controller.accept(&user, id).await?))
}

async fn reject_bid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Bid>>, AppError> {
    let controller = BidController::new(&state)?;
    Ok(Json(controller.reject(&user, id).await?))
}

async fn withdraw_bid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Bid>>, AppError> {
    let controller = BidController::new(&state)?;
    Ok(Json(controller.withdraw(&user, id).await?))
}
