//! Servicio de flota
//!
//! Empresas (admin), conductores, vehículos y documentos de cumplimiento
//! (portal). Los usuarios de empresa solo ven y tocan lo de su empresa; el
//! admin ve todo y elige la empresa al crear.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::auth::AuthUser;
use crate::models::company::{Company, RecordStatus};
use crate::models::document::{Document, DocumentKind, DocumentStatus};
use crate::models::driver::Driver;
use crate::models::vehicle::Vehicle;
use crate::repositories::{FleetRepository, Repositories};
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::validate_registration;

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub company_id: Option<Uuid>,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub licence_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub company_id: Option<Uuid>,
    pub registration: String,
    pub vehicle_type: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub capacity_kg: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub owner_id: Uuid,
    pub document_type: String,
    pub file_url: String,
    pub expires_on: Option<NaiveDate>,
}

pub struct FleetService {
    fleet: Arc<dyn FleetRepository>,
}

/// `None` = sin filtro (admin)
fn scope(user: &AuthUser) -> AppResult<Option<Uuid>> {
    if user.is_admin() {
        return Ok(None);
    }
    user.company_id
        .map(Some)
        .ok_or_else(|| forbidden_error("manage fleet", "your account is not linked to a company"))
}

/// Empresa destino de un alta: la propia, o la indicada por un admin
fn target_company(user: &AuthUser, requested: Option<Uuid>) -> AppResult<Uuid> {
    match scope(user)? {
        Some(own) => Ok(own),
        None => requested.ok_or_else(|| validation_error("company_id", "company_id is required")),
    }
}

impl FleetService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            fleet: repos.fleet.clone(),
        }
    }

    pub async fn create_company(
        &self,
        name: String,
        email: Option<String>,
        phone: Option<String>,
        address: Option<String>,
    ) -> AppResult<Company> {
        if name.trim().is_empty() {
            return Err(validation_error("name", "Company name is required"));
        }
        let company = self
            .fleet
            .insert_company(Company::new(name.trim().to_string(), email, phone, address))
            .await?;
        info!("🏢 Empresa creada por admin: {}", company.name);
        Ok(company)
    }

    pub async fn list_companies(&self) -> AppResult<Vec<Company>> {
        self.fleet.list_companies().await
    }

    pub async fn set_company_status(
        &self,
        id: Uuid,
        status: RecordStatus,
        approved: Option<bool>,
    ) -> AppResult<Company> {
        let company = self
            .fleet
            .set_company_status(id, status, approved)
            .await?
            .ok_or_else(|| not_found_error("Company", &id.to_string()))?;
        info!(
            company_id = %id,
            status = company.status.as_str(),
            approved = company.approved,
            "🏢 Estado de empresa actualizado"
        );
        Ok(company)
    }

    async fn ensure_company(&self, company_id: Uuid) -> AppResult<()> {
        match self.fleet.find_company(company_id).await? {
            Some(_) => Ok(()),
            None => Err(not_found_error("Company", &company_id.to_string())),
        }
    }

    pub async fn create_driver(&self, user: &AuthUser, new_driver: NewDriver) -> AppResult<Driver> {
        let company_id = target_company(user, new_driver.company_id)?;
        if new_driver.full_name.trim().is_empty() {
            return Err(validation_error("full_name", "Driver name is required"));
        }
        if user.is_admin() {
            self.ensure_company(company_id).await?;
        }

        let driver = Driver {
            id: Uuid::new_v4(),
            company_id,
            full_name: new_driver.full_name.trim().to_string(),
            phone: new_driver.phone,
            email: new_driver.email,
            licence_number: new_driver.licence_number,
            status: RecordStatus::Active,
            created_at: Utc::now(),
        };
        let driver = self.fleet.insert_driver(driver).await?;
        info!(company_id = %company_id, "🧑‍✈️ Conductor añadido: {}", driver.full_name);
        Ok(driver)
    }

    pub async fn list_drivers(&self, user: &AuthUser) -> AppResult<Vec<Driver>> {
        self.fleet.list_drivers(scope(user)?).await
    }

    pub async fn set_driver_status(&self, user: &AuthUser, id: Uuid, status: RecordStatus) -> AppResult<Driver> {
        self.fleet
            .set_driver_status(id, scope(user)?, status)
            .await?
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))
    }

    pub async fn create_vehicle(&self, user: &AuthUser, new_vehicle: NewVehicle) -> AppResult<Vehicle> {
        let company_id = target_company(user, new_vehicle.company_id)?;
        if validate_registration(&new_vehicle.registration).is_err() {
            return Err(validation_error("registration", "Registration is not valid"));
        }
        if new_vehicle.vehicle_type.trim().is_empty() {
            return Err(validation_error("vehicle_type", "Vehicle type is required"));
        }
        if user.is_admin() {
            self.ensure_company(company_id).await?;
        }

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            company_id,
            // Misma matrícula escrita distinto es el mismo vehículo
            registration: new_vehicle.registration.replace([' ', '-', '_'], "").to_uppercase(),
            vehicle_type: new_vehicle.vehicle_type.trim().to_string(),
            make: new_vehicle.make,
            model: new_vehicle.model,
            capacity_kg: new_vehicle.capacity_kg,
            created_at: Utc::now(),
        };
        let vehicle = self.fleet.insert_vehicle(vehicle).await?;
        info!(company_id = %company_id, "🚛 Vehículo añadido: {}", vehicle.registration);
        Ok(vehicle)
    }

    pub async fn list_vehicles(&self, user: &AuthUser) -> AppResult<Vec<Vehicle>> {
        self.fleet.list_vehicles(scope(user)?).await
    }

    pub async fn delete_vehicle(&self, user: &AuthUser, id: Uuid) -> AppResult<()> {
        if self.fleet.delete_vehicle(id, scope(user)?).await? {
            info!(vehicle_id = %id, "🗑️ Vehículo eliminado");
            Ok(())
        } else {
            Err(not_found_error("Vehicle", &id.to_string()))
        }
    }

    /// Alta de documento; el dueño (conductor o vehículo) debe ser de la empresa
    pub async fn create_document(&self, user: &AuthUser, new_document: NewDocument) -> AppResult<Document> {
        let scope = scope(user)?;
        if new_document.document_type.trim().is_empty() {
            return Err(validation_error("document_type", "Document type is required"));
        }
        if new_document.file_url.trim().is_empty() {
            return Err(validation_error("file_url", "File URL is required"));
        }

        let owner_company = match new_document.kind {
            DocumentKind::Driver => self
                .fleet
                .list_drivers(scope)
                .await?
                .into_iter()
                .find(|d| d.id == new_document.owner_id)
                .map(|d| d.company_id),
            DocumentKind::Vehicle => self
                .fleet
                .find_vehicle(new_document.owner_id)
                .await?
                .filter(|v| scope.map_or(true, |c| v.company_id == c))
                .map(|v| v.company_id),
        };
        let company_id = owner_company.ok_or_else(|| {
            AppError::NotFound(format!(
                "{:?} with id '{}' not found",
                new_document.kind, new_document.owner_id
            ))
        })?;

        let document = Document {
            id: Uuid::new_v4(),
            kind: new_document.kind,
            owner_id: new_document.owner_id,
            company_id,
            document_type: new_document.document_type.trim().to_string(),
            file_url: new_document.file_url.trim().to_string(),
            expires_on: new_document.expires_on,
            status: DocumentStatus::Pending,
            created_at: Utc::now(),
        };
        let document = self.fleet.insert_document(document).await?;
        info!(document_id = %document.id, "📄 Documento subido: {}", document.document_type);
        Ok(document)
    }

    /// Documentos con el estado efectivo (caducados según la fecha de hoy)
    pub async fn list_documents(&self, user: &AuthUser) -> AppResult<Vec<Document>> {
        let today = Utc::now().date_naive();
        let documents = self.fleet.list_documents(scope(user)?).await?;
        Ok(documents
            .into_iter()
            .map(|mut d| {
                d.status = d.effective_status(today);
                d
            })
            .collect())
    }

    pub async fn set_document_status(
        &self,
        kind: DocumentKind,
        id: Uuid,
        status: DocumentStatus,
    ) -> AppResult<Document> {
        let document = self
            .fleet
            .set_document_status(kind, id, status)
            .await?
            .ok_or_else(|| not_found_error("Document", &id.to_string()))?;
        info!(document_id = %id, status = status.as_str(), "📄 Documento revisado");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    fn member(company_id: Option<Uuid>, role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: "fleet@example.com".to_string(),
            role,
            company_id,
        }
    }

    fn vehicle(registration: &str) -> NewVehicle {
        NewVehicle {
            company_id: None,
            registration: registration.to_string(),
            vehicle_type: "luton".to_string(),
            make: None,
            model: None,
            capacity_kg: None,
        }
    }

    #[tokio::test]
    async fn test_vehicles_are_company_scoped() {
        let service = FleetService::new(&Repositories::memory());
        let a = member(Some(Uuid::new_v4()), Role::Company);
        let b = member(Some(Uuid::new_v4()), Role::Company);

        let van = service.create_vehicle(&a, vehicle("ab12 cde")).await.unwrap();
        assert_eq!(van.registration, "AB12CDE");
        assert_eq!(service.list_vehicles(&b).await.unwrap().len(), 0);
        assert_eq!(service.delete_vehicle(&b, van.id).await.unwrap_err().code(), "NOT_FOUND");

        let dup = service.create_vehicle(&a, vehicle("AB12-CDE")).await.unwrap_err();
        assert_eq!(dup.code(), "CONFLICT");

        service.delete_vehicle(&a, van.id).await.unwrap();
        assert!(service.list_vehicles(&a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_needs_existing_company() {
        let service = FleetService::new(&Repositories::memory());
        let admin = member(None, Role::Admin);

        let err = service.create_vehicle(&admin, vehicle("AB12CDE")).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let mut missing = vehicle("AB12CDE");
        missing.company_id = Some(Uuid::new_v4());
        assert_eq!(service.create_vehicle(&admin, missing).await.unwrap_err().code(), "NOT_FOUND");

        let company = service
            .create_company("Haulage Ltd".to_string(), None, None, None)
            .await
            .unwrap();
        let mut ok = vehicle("AB12CDE");
        ok.company_id = Some(company.id);
        assert_eq!(service.create_vehicle(&admin, ok).await.unwrap().company_id, company.id);
    }

    #[tokio::test]
    async fn test_document_for_foreign_driver_not_found() {
        let service = FleetService::new(&Repositories::memory());
        let a = member(Some(Uuid::new_v4()), Role::Company);
        let b = member(Some(Uuid::new_v4()), Role::Broker);

        let driver = service
            .create_driver(
                &a,
                NewDriver {
                    company_id: None,
                    full_name: "Sam Driver".to_string(),
                    phone: None,
                    email: None,
                    licence_number: None,
                },
            )
            .await
            .unwrap();

        let doc = NewDocument {
            kind: DocumentKind::Driver,
            owner_id: driver.id,
            document_type: "driving_licence".to_string(),
            file_url: "https://files.example.com/licence.pdf".to_string(),
            expires_on: NaiveDate::from_ymd_opt(2000, 1, 1),
        };
        assert_eq!(service.create_document(&b, doc.clone()).await.unwrap_err().code(), "NOT_FOUND");

        let created = service.create_document(&a, doc).await.unwrap();
        assert_eq!(created.status, DocumentStatus::Pending);
        assert_eq!(created.company_id, a.company_id.unwrap());

        // Caducado según la fecha
        let listed = service.list_documents(&a).await.unwrap();
        assert_eq!(listed[0].status, DocumentStatus::Expired);
    }

    #[tokio::test]
    async fn test_user_without_company_forbidden() {
        let service = FleetService::new(&Repositories::memory());
        let orphan = member(None, Role::Driver);
        assert_eq!(service.list_drivers(&orphan).await.unwrap_err().code(), "FORBIDDEN");
    }
}
