use axum::{
    extract::{Path, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::invoice_controller::InvoiceController;
use crate::dto::invoice_dto::{CreateInvoiceRequest, InvoicePreviewRequest, UpdateInvoiceRequest};
use crate::dto::ApiResponse;
use crate::middleware::gated;
use crate::models::invoice::Invoice;
use crate::services::access_policy::View;
use crate::services::invoice_service::InvoicePreview;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_invoice_router(state: &AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/preview", post(preview_invoice))
        .route("/:id", get(get_invoice).put(update_invoice))
        .route("/:id/print", get(print_invoice));

    gated(state, View::Invoices, router)
}

async fn preview_invoice(
    Json(request): Json<InvoicePreviewRequest>,
) -> Result<Json<ApiResponse<InvoicePreview>>, AppError> {
    Ok(Json(InvoiceController::preview(request)?))
}

async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<ApiResponse<Invoice>>, AppError> {
    let controller = InvoiceController::new(&state)?;
    Ok(Json(controller.create(request).await?))
}

async fn list_invoices(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Invoice>>>, AppError> {
    let controller = InvoiceController::new(&state)?;
    Ok(Json(controller.list().await?))
}

async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Invoice>>, AppError> {
    let controller = InvoiceController::new(&state)?;
    Ok(Json(controller.get(id).await?))
}

async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceRequest>,
) -> Result<Json<ApiResponse<Invoice>>, AppError> {
    let controller = InvoiceController::new(&state)?;
    Ok(Json(controller.update(id, request).await?))
}

async fn print_invoice(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Html<String>, AppError> {
    let controller = InvoiceController::new(&state)?;
    Ok(Html(controller.print(id).await?))
}
