use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::auth_controller::AuthController;
use crate::controllers::fleet_controller::FleetController;
use crate::dto::auth_dto::ChangeRoleRequest;
use crate::dto::fleet_dto::{CompanyStatusRequest, CreateCompanyRequest, DocumentStatusRequest};
use crate::dto::ApiResponse;
use crate::middleware::gated;
use crate::models::company::Company;
use crate::models::document::{Document, DocumentKind};
use crate::models::profile::Profile;
use crate::services::access_policy::View;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Backoffice de administración
pub fn create_admin_router(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/:id/status", put(set_company_status))
        .route("/users/:id/role", put(change_role))
        .route("/documents/:kind/:id/status", put(set_document_status));

    gated(state, View::Admin, router)
}

async fn list_companies(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Company>>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.list_companies().await?))
}

async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<Json<ApiResponse<Company>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.create_company(request).await?))
}

async fn set_company_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompanyStatusRequest>,
) -> Result<Json<ApiResponse<Company>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.set_company_status(id, request).await?))
}

async fn change_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let controller = AuthController::new(&state)?;
    Ok(Json(controller.change_role(id, request).await?))
}

async fn set_document_status(
    State(state): State<AppState>,
    Path((kind, id)): Path<(DocumentKind, Uuid)>,
    Json(request): Json<DocumentStatusRequest>,
) -> Result<Json<ApiResponse<Document>>, AppError> {
    let controller = FleetController::new(&state)?;
    Ok(Json(controller.set_document_status(kind, id, request).await?))
}
