//! Repositorios
//!
//! Traits de almacenamiento y sus dos implementaciones: PostgreSQL (sqlx) y
//! memoria. Los servicios son los únicos que llaman a estos traits.
//!
//! Las transiciones de estado son escrituras condicionales: devuelven
//! `Ok(None)` cuando la fila no existe o su estado actual no es el esperado.

pub mod bid_repository;
pub mod fleet_repository;
pub mod invoice_repository;
pub mod job_repository;
pub mod memory;
pub mod profile_repository;

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::auth::Role;
use crate::models::bid::{Bid, BidStatus};
use crate::models::company::{Company, RecordStatus};
use crate::models::document::{Document, DocumentKind, DocumentStatus};
use crate::models::driver::Driver;
use crate::models::invoice::Invoice;
use crate::models::job::{Job, StatusChange};
use crate::models::profile::Profile;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::AppResult;

pub use memory::MemoryStore;

/// Mensaje de conflicto cuando ya existe un bid vivo para (job, empresa)
pub const ALREADY_BID: &str = "Your company has already bid on this job";

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: Job) -> AppResult<Job>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>>;
    /// Todos los jobs, más recientes primero (desempate por id)
    async fn list_all(&self) -> AppResult<Vec<Job>>;
    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Job>>;
    async fn change_status(&self, id: Uuid, change: StatusChange) -> AppResult<Option<Job>>;
}

/// Resultado de aceptar un bid dentro de una única transacción
#[derive(Debug, Clone)]
pub struct AcceptedBid {
    pub bid: Bid,
    pub job: Job,
    pub rejected: u64,
}

#[async_trait]
pub trait BidRepository: Send + Sync {
    /// Inserta solo si el job sigue `open`; un bid vivo duplicado es `Conflict`
    async fn insert(&self, bid: Bid) -> AppResult<Bid>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bid>>;
    async fn list_by_job(&self, job_id: Uuid) -> AppResult<Vec<Bid>>;
    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Bid>>;
    async fn list_all(&self) -> AppResult<Vec<Bid>>;
    async fn set_status(&self, id: Uuid, expected: BidStatus, next: BidStatus) -> AppResult<Option<Bid>>;
    /// Bid -> accepted, resto de bids vivos -> rejected, job open -> assigned
    async fn accept(&self, bid_id: Uuid) -> AppResult<Option<AcceptedBid>>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn insert(&self, invoice: Invoice) -> AppResult<Invoice>;
    /// Mayor sufijo numérico ya emitido con ese prefijo (0 si no hay ninguno)
    async fn last_number_suffix(&self, prefix: &str) -> AppResult<u32>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invoice>>;
    async fn list_all(&self) -> AppResult<Vec<Invoice>>;
    async fn update(&self, invoice: Invoice) -> AppResult<Option<Invoice>>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn insert(&self, profile: Profile) -> AppResult<Profile>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>>;
    async fn set_role(&self, id: Uuid, role: Role) -> AppResult<Option<Profile>>;
}

#[async_trait]
pub trait FleetRepository: Send + Sync {
    async fn insert_company(&self, company: Company) -> AppResult<Company>;
    async fn find_company(&self, id: Uuid) -> AppResult<Option<Company>>;
    async fn list_companies(&self) -> AppResult<Vec<Company>>;
    async fn set_company_status(
        &self,
        id: Uuid,
        status: RecordStatus,
        approved: Option<bool>,
    ) -> AppResult<Option<Company>>;

    async fn insert_driver(&self, driver: Driver) -> AppResult<Driver>;
    async fn list_drivers(&self, company_id: Option<Uuid>) -> AppResult<Vec<Driver>>;
    async fn set_driver_status(
        &self,
        id: Uuid,
        company_id: Option<Uuid>,
        status: RecordStatus,
    ) -> AppResult<Option<Driver>>;

    async fn insert_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle>;
    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    async fn list_vehicles(&self, company_id: Option<Uuid>) -> AppResult<Vec<Vehicle>>;
    async fn delete_vehicle(&self, id: Uuid, company_id: Option<Uuid>) -> AppResult<bool>;

    async fn insert_document(&self, document: Document) -> AppResult<Document>;
    async fn list_documents(&self, company_id: Option<Uuid>) -> AppResult<Vec<Document>>;
    async fn set_document_status(
        &self,
        kind: DocumentKind,
        id: Uuid,
        status: DocumentStatus,
    ) -> AppResult<Option<Document>>;
}

/// Conjunto de handles al backing store, construido una vez al arrancar
#[derive(Clone)]
pub struct Repositories {
    pub jobs: Arc<dyn JobRepository>,
    pub bids: Arc<dyn BidRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub fleet: Arc<dyn FleetRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            jobs: Arc::new(job_repository::PgJobRepository::new(pool.clone())),
            bids: Arc::new(bid_repository::PgBidRepository::new(pool.clone())),
            invoices: Arc::new(invoice_repository::PgInvoiceRepository::new(pool.clone())),
            profiles: Arc::new(profile_repository::PgProfileRepository::new(pool.clone())),
            fleet: Arc::new(fleet_repository::PgFleetRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            jobs: Arc::new(store.clone()),
            bids: Arc::new(store.clone()),
            invoices: Arc::new(store.clone()),
            profiles: Arc::new(store.clone()),
            fleet: Arc::new(store),
        }
    }
}
