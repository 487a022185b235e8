use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::invoice_dto::{CreateInvoiceRequest, InvoicePreviewRequest, UpdateInvoiceRequest};
use crate::dto::ApiResponse;
use crate::models::invoice::Invoice;
use crate::services::invoice_service::{self, InvoicePreview, InvoiceService};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct InvoiceController {
    service: InvoiceService,
}

impl InvoiceController {
    pub fn new(state: &AppState) -> AppResult<Self> {
        Ok(Self {
            service: InvoiceService::new(state.repos()?),
        })
    }

    /// Sin estado: no necesita backing store
    pub fn preview(request: InvoicePreviewRequest) -> AppResult<ApiResponse<InvoicePreview>> {
        request.validate()?;
        let issue_date = request.issue_date.unwrap_or_else(|| Utc::now().date_naive());
        let preview = invoice_service::preview(request.net_amount, request.vat_rate, request.payment_terms, issue_date)?;
        Ok(ApiResponse::success(preview))
    }

    pub async fn create(&self, request: CreateInvoiceRequest) -> AppResult<ApiResponse<Invoice>> {
        request.validate()?;
        let invoice = self.service.create(request.into()).await?;
        Ok(ApiResponse::success_with_message(invoice, "Invoice created"))
    }

    pub async fn list(&self) -> AppResult<ApiResponse<Vec<Invoice>>> {
        Ok(ApiResponse::success(self.service.list().await?))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<Invoice>> {
        Ok(ApiResponse::success(self.service.get(id).await?))
    }

    pub async fn update(&self, id: Uuid, request: UpdateInvoiceRequest) -> AppResult<ApiResponse<Invoice>> {
        request.validate()?;
        let invoice = self.service.update(id, request.into()).await?;
        Ok(ApiResponse::success_with_message(invoice, "Invoice updated"))
    }

    pub async fn print(&self, id: Uuid) -> AppResult<String> {
        self.service.print(id).await
    }
}
