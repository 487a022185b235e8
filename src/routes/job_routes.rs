use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::bid_controller::BidController;
use crate::controllers::delivery_controller::DeliveryController;
use crate::controllers::job_controller::JobController;
use crate::dto::bid_dto::SubmitBidRequest;
use crate::dto::delivery_dto::{DelayRequest, DeliverRequest, PickupRequest};
use crate::dto::job_dto::CreateJobRequest;
use crate::dto::ApiResponse;
use crate::middleware::gated;
use crate::models::auth::AuthUser;
use crate::models::bid::Bid;
use crate::models::job::Job;
use crate::services::access_policy::View;
use crate::services::delivery_service::DelayNotice;
use crate::services::job_query::JobQuery;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas bajo `/api/jobs`, cada grupo protegido por su vista
pub fn create_job_router(state: &AppState) -> Router<AppState> {
    let browse = Router::new()
        .route("/", get(list_jobs))
        .route("/:id", get(get_job));

    let posting = Router::new()
        .route("/", post(create_job))
        .route("/export", get(export_jobs))
        .route("/:id/publish", post(publish_job))
        .route("/:id/cancel", post(cancel_job))
        .route("/:id/bids", get(list_job_bids));

    let bidding = Router::new().route("/:id/bids", post(submit_bid));

    let delivery = Router::new()
        .route("/:id/pickup", post(pickup))
        .route("/:id/deliver", post(deliver))
        .route("/:id/delay", post(delay));

    Router::new()
        .merge(gated(state, View::Jobs, browse))
        .merge(gated(state, View::JobPosting, posting))
        .merge(gated(state, View::Bidding, bidding))
        .merge(gated(state, View::Delivery, delivery))
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<Json<ApiResponse<Vec<Job>>>, AppError> {
    let controller = JobController::new(&state)?;
    Ok(Json(controller.list(query).await?))
}

async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ApiResponse<Job>>, AppError> {
    let controller = JobController::new(&state)?;
    Ok(Json(controller.get(id).await?))
}

async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let controller = JobController::new(&state)?;
    Ok(Json(controller.create(&user, request).await?))
}

async fn export_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<JobQuery>,
) -> Result<impl IntoResponse, AppError> {
    let controller = JobController::new(&state)?;
    let (filename, csv) = controller.export(&user, query).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        csv,
    ))
}

async fn publish_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let controller = JobController::new(&state)?;
    Ok(Json(controller.publish(&user, id).await?))
}

async fn cancel_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let controller = JobController::new(&state)?;
    Ok(Json(controller.cancel(&user, id).await?))
}

async fn list_job_bids(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Bid>>>, AppError> {
    let controller = BidController::new(&state)?;
    Ok(Json(controller.list_for_job(&user, id).await?))
}

async fn submit_bid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitBidRequest>,
) -> Result<Json<ApiResponse<Bid>>, AppError> {
    let controller = BidController::new(&state)?;
    Ok(Json(controller.submit(&user, id, request).await?))
}

async fn pickup(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    request: Option<Json<PickupRequest>>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let controller = DeliveryController::new(&state)?;
    let request = request.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(controller.pickup(&user, id, request).await?))
}

async fn deliver(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<DeliverRequest>,
) -> Result<Json<ApiResponse<Job>>, AppError> {
    let controller = DeliveryController::new(&state)?;
    Ok(Json(controller.deliver(&user, id, request).await?))
}

async fn delay(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<DelayRequest>,
) -> Result<Json<ApiResponse<DelayNotice>>, AppError> {
    let controller = DeliveryController::new(&state)?;
    Ok(Json(controller.delay(&user, id, request).await?))
}
