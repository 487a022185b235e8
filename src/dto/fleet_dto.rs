use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::company::RecordStatus;
use crate::models::document::{DocumentKind, DocumentStatus};
use crate::services::fleet_service::{NewDocument, NewDriver, NewVehicle};
use crate::utils::validation::{validate_phone, validate_registration};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyStatusRequest {
    pub status: RecordStatus,
    pub approved: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub licence_number: Option<String>,
}

impl From<CreateDriverRequest> for NewDriver {
    fn from(request: CreateDriverRequest) -> Self {
        Self {
            company_id: request.company_id,
            full_name: request.full_name,
            phone: request.phone,
            email: request.email,
            licence_number: request.licence_number,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DriverStatusRequest {
    pub status: RecordStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub company_id: Option<Uuid>,
    #[validate(custom = "validate_registration")]
    pub registration: String,
    #[validate(length(min = 1, max = 50))]
    pub vehicle_type: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub capacity_kg: Option<Decimal>,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        Self {
            company_id: request.company_id,
            registration: request.registration,
            vehicle_type: request.vehicle_type,
            make: request.make,
            model: request.model,
            capacity_kg: request.capacity_kg,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    pub kind: DocumentKind,
    pub owner_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub document_type: String,
    #[validate(url)]
    pub file_url: String,
    pub expires_on: Option<NaiveDate>,
}

impl From<CreateDocumentRequest> for NewDocument {
    fn from(request: CreateDocumentRequest) -> Self {
        Self {
            kind: request.kind,
            owner_id: request.owner_id,
            document_type: request.document_type,
            file_url: request.file_url,
            expires_on: request.expires_on,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentStatusRequest {
    pub status: DocumentStatus,
}
