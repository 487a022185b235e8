use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::fleet_controller::FleetController;
use crate::dto::fleet_dto::{CreateDocumentRequest, CreateDriverRequest, CreateVehicleRequest, DriverStatusRequest};
use crate::dto::ApiResponse;
use crate::middleware::gated;
use crate::models::auth::AuthUser;
use crate::models::document::Document;
use crate::models::driver::Driver;
use crate::models::vehicle::Vehicle;
use crate::services::access_policy::View;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Portal de empresa: conductores, vehículos y documentos propios
pub fn create_portal_router(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/drivers/:id/status", put(set_driver_status))
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route("/vehicles/:id", delete(delete_vehicle))
        .route("/documents", get(list_documents).post(create_document));

    gated(state, View::Portal, router)
}

async fn list_drivers(State(state): State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<Vec<Driver>>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.list_drivers(&user).await?))
}

async fn create_driver(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.create_driver(&user, request).await?))
}

async fn set_driver_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<DriverStatusRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.set_driver_status(&user, id, request).await?))
}

async fn list_vehicles(State(state): State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.list_vehicles(&user).await?))
}

async fn create_vehicle(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.create_vehicle(&user, request).await?))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.delete_vehicle(&user, id).await?))
}

async fn list_documents(State(state): State<AppState>, user: AuthUser) -> Result<Json<ApiResponse<Vec<Document>>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.list_documents(&user).await?))
}

async fn create_document(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<Json<ApiResponse<Document>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.create_document(&user, request).await?))
}
