use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::config::business::DEFAULT_VAT_RATE;
use crate::models::invoice::{PaymentStatus, PaymentTerms};
use crate::services::invoice_service::{InvoiceChanges, InvoiceDraft};
use crate::utils::validation::non_negative_amount;

fn default_vat_rate() -> u32 {
    DEFAULT_VAT_RATE
}

fn default_terms() -> PaymentTerms {
    PaymentTerms::Days30
}

#[derive(Debug, Deserialize, Validate)]
pub struct InvoicePreviewRequest {
    #[validate(custom = "non_negative_amount")]
    pub net_amount: Decimal,
    #[serde(default = "default_vat_rate")]
    pub vat_rate: u32,
    #[serde(default = "default_terms")]
    pub payment_terms: PaymentTerms,
    pub issue_date: Option<NaiveDate>,
}

// Request para emitir una factura
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub job_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub customer_name: String,
    #[validate(email)]
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "non_negative_amount")]
    pub net_amount: Decimal,
    #[serde(default = "default_vat_rate")]
    pub vat_rate: u32,
    #[serde(default = "default_terms")]
    pub payment_terms: PaymentTerms,
    pub issue_date: Option<NaiveDate>,
}

impl From<CreateInvoiceRequest> for InvoiceDraft {
    fn from(request: CreateInvoiceRequest) -> Self {
        Self {
            job_id: request.job_id,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_address: request.customer_address,
            description: request.description,
            net_amount: request.net_amount,
            vat_rate: request.vat_rate,
            payment_terms: request.payment_terms,
            issue_date: request.issue_date,
        }
    }
}

// Request para actualizar una factura (campos opcionales)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    #[validate(length(min = 1, max = 200))]
    pub customer_name: Option<String>,
    #[validate(email)]
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "non_negative_amount")]
    pub net_amount: Option<Decimal>,
    pub vat_rate: Option<u32>,
    pub payment_terms: Option<PaymentTerms>,
    pub payment_status: Option<PaymentStatus>,
}

impl From<UpdateInvoiceRequest> for InvoiceChanges {
    fn from(request: UpdateInvoiceRequest) -> Self {
        Self {
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_address: request.customer_address,
            description: request.description,
            net_amount: request.net_amount,
            vat_rate: request.vat_rate,
            payment_terms: request.payment_terms,
            payment_status: request.payment_status,
        }
    }
}
