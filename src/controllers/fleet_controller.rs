use uuid::Uuid;
use validator::Validate;

use crate::dto::fleet_dto::{
    CompanyStatusRequest, CreateCompanyRequest, CreateDocumentRequest, CreateDriverRequest,
    CreateVehicleRequest, DocumentStatusRequest, DriverStatusRequest,
};
use crate::dto::ApiResponse;
use crate::models::auth::AuthUser;
use crate::models::company::Company;
use crate::models::document::{Document, DocumentKind};
use crate::models::driver::Driver;
use crate::models::vehicle::Vehicle;
use crate::services::fleet_service::FleetService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct FleetController {
    service: FleetService,
}

impl FleetController {
    pub fn new(state: &AppState) -> AppResult<Self> {
        Ok(Self {
            service: FleetService::new(state.repos()?),
        })
    }

    // Admin

    pub async fn create_company(&self, request: CreateCompanyRequest) -> AppResult<ApiResponse<Company>> {
        request.validate()?;
        let company = self
            .service
            .create_company(request.name, request.email, request.phone, request.address)
            .await?;
        Ok(ApiResponse::success_with_message(company, "Company created"))
    }

    pub async fn list_companies(&self) -> AppResult<ApiResponse<Vec<Company>>> {
        Ok(ApiResponse::success(self.service.list_companies().await?))
    }

    pub async fn set_company_status(&self, id: Uuid, request: CompanyStatusRequest) -> AppResult<ApiResponse<Company>> {
        let company = self.service.set_company_status(id, request.status, request.approved).await?;
        Ok(ApiResponse::success_with_message(company, "Company updated"))
    }

    pub async fn set_document_status(
        &self,
        kind: DocumentKind,
        id: Uuid,
        request: DocumentStatusRequest,
    ) -> AppResult<ApiResponse<Document>> {
        let document = self.service.set_document_status(kind, id, request.status).await?;
        Ok(ApiResponse::success_with_message(document, "Document reviewed"))
    }

    // Portal

    pub async fn create_driver(&self, user: &AuthUser, request: CreateDriverRequest) -> AppResult<ApiResponse<Driver>> {
        request.validate()?;
        let driver = self.service.create_driver(user, request.into()).await?;
        Ok(ApiResponse::success_with_message(driver, "Driver added"))
    }

    pub async fn list_drivers(&self, user: &AuthUser) -> AppResult<ApiResponse<Vec<Driver>>> {
        Ok(ApiResponse::success(self.service.list_drivers(user).await?))
    }

    pub async fn set_driver_status(
        &self,
        user: &AuthUser,
        id: Uuid,
        request: DriverStatusRequest,
    ) -> AppResult<ApiResponse<Driver>> {
        let driver = self.service.set_driver_status(user, id, request.status).await?;
        Ok(ApiResponse::success_with_message(driver, "Driver updated"))
    }

    pub async fn create_vehicle(&self, user: &AuthUser, request: CreateVehicleRequest) -> AppResult<ApiResponse<Vehicle>> {
        request.validate()?;
        let vehicle = self.service.create_vehicle(user, request.into()).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle added"))
    }

    pub async fn list_vehicles(&self, user: &AuthUser) -> AppResult<ApiResponse<Vec<Vehicle>>> {
        Ok(ApiResponse::success(self.service.list_vehicles(user).await?))
    }

    pub async fn delete_vehicle(&self, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<()>> {
        self.service.delete_vehicle(user, id).await?;
        Ok(ApiResponse::message("Vehicle deleted"))
    }

    pub async fn create_document(&self, user: &AuthUser, request: CreateDocumentRequest) -> AppResult<ApiResponse<Document>> {
        request.validate()?;
        let document = self.service.create_document(user, request.into()).await?;
        Ok(ApiResponse::success_with_message(document, "Document uploaded"))
    }

    pub async fn list_documents(&self, user: &AuthUser) -> AppResult<ApiResponse<Vec<Document>>> {
        Ok(ApiResponse::success(self.service.list_documents(user).await?))
    }
}
