//! Backing store en memoria
//!
//! Mismas semánticas que la implementación PostgreSQL: escrituras
//! condicionales, un bid vivo por (job, empresa) y aceptación atómica bajo
//! un único write lock. Se usa con `STORE_BACKEND=memory` y en los tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AcceptedBid, BidRepository, FleetRepository, InvoiceRepository, JobRepository, ProfileRepository,
    ALREADY_BID,
};
use crate::models::auth::Role;
use crate::models::bid::{Bid, BidStatus};
use crate::models::company::{Company, RecordStatus};
use crate::models::document::{Document, DocumentKind, DocumentStatus};
use crate::models::driver::Driver;
use crate::models::invoice::Invoice;
use crate::models::job::{Job, JobStatus, StatusChange};
use crate::models::profile::Profile;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    jobs: HashMap<Uuid, Job>,
    bids: HashMap<Uuid, Bid>,
    invoices: HashMap<Uuid, Invoice>,
    profiles: HashMap<Uuid, Profile>,
    companies: HashMap<Uuid, Company>,
    drivers: HashMap<Uuid, Driver>,
    vehicles: HashMap<Uuid, Vehicle>,
    documents: HashMap<Uuid, Document>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first_jobs(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    jobs
}

fn newest_first_bids(mut bids: Vec<Bid>) -> Vec<Bid> {
    bids.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    bids
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn insert(&self, job: Job) -> AppResult<Job> {
        let mut tables = self.tables.write().await;
        if tables.jobs.contains_key(&job.id) {
            return Err(AppError::Conflict("Job already exists".to_string()));
        }
        tables.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        Ok(self.tables.read().await.jobs.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(newest_first_jobs(tables.jobs.values().cloned().collect()))
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Job>> {
        let tables = self.tables.read().await;
        let jobs = tables
            .jobs
            .values()
            .filter(|job| job.company_id == company_id)
            .cloned()
            .collect();
        Ok(newest_first_jobs(jobs))
    }

    async fn change_status(&self, id: Uuid, change: StatusChange) -> AppResult<Option<Job>> {
        let mut tables = self.tables.write().await;
        let job = match tables.jobs.get_mut(&id) {
            Some(job) if change.expected.contains(&job.status) => job,
            _ => return Ok(None),
        };

        job.status = change.next;
        if let Some(vehicle_type) = change.assigned_vehicle_type {
            job.assigned_vehicle_type = Some(vehicle_type);
        }
        if let Some(proof) = change.proof {
            job.recipient_name = Some(proof.recipient_name);
            job.signature_url = Some(proof.signature_url);
            job.photo_urls = proof.photo_urls;
            job.delivered_at = Some(proof.delivered_at);
        }
        job.updated_at = Utc::now();

        Ok(Some(job.clone()))
    }
}

#[async_trait]
impl BidRepository for MemoryStore {
    async fn insert(&self, bid: Bid) -> AppResult<Bid> {
        let mut tables = self.tables.write().await;

        let job_open = tables
            .jobs
            .get(&bid.job_id)
            .map(|job| job.status == JobStatus::Open)
            .unwrap_or(false);
        if !job_open {
            return Err(AppError::Conflict("Job is not open for bidding".to_string()));
        }

        let duplicate = tables.bids.values().any(|existing| {
            existing.job_id == bid.job_id
                && existing.bidder_company_id == bid.bidder_company_id
                && existing.status.is_live()
        });
        if duplicate {
            return Err(AppError::Conflict(ALREADY_BID.to_string()));
        }

        tables.bids.insert(bid.id, bid.clone());
        Ok(bid)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bid>> {
        Ok(self.tables.read().await.bids.get(&id).cloned())
    }

    async fn list_by_job(&self, job_id: Uuid) -> AppResult<Vec<Bid>> {
        let tables = self.tables.read().await;
        let bids = tables.bids.values().filter(|b| b.job_id == job_id).cloned().collect();
        Ok(newest_first_bids(bids))
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Bid>> {
        let tables = self.tables.read().await;
        let bids = tables
            .bids
            .values()
            .filter(|b| b.bidder_company_id == company_id)
            .cloned()
            .collect();
        Ok(newest_first_bids(bids))
    }

    async fn list_all(&self) -> AppResult<Vec<Bid>> {
        let tables = self.tables.read().await;
        Ok(newest_first_bids(tables.bids.values().cloned().collect()))
    }

    async fn set_status(&self, id: Uuid, expected: BidStatus, next: BidStatus) -> AppResult<Option<Bid>> {
        let mut tables = self.tables.write().await;
        match tables.bids.get_mut(&id) {
            Some(bid) if bid.status == expected => {
                bid.status = next;
                bid.updated_at = Utc::now();
                Ok(Some(bid.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn accept(&self, bid_id: Uuid) -> AppResult<Option<AcceptedBid>> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let bid = match tables.bids.get(&bid_id) {
            Some(bid) if bid.status == BidStatus::Submitted => bid.clone(),
            _ => return Ok(None),
        };

        let job = match tables.jobs.get_mut(&bid.job_id) {
            Some(job) if job.status == JobStatus::Open => {
                job.status = JobStatus::Assigned;
                job.agreed_rate = Some(bid.amount);
                job.updated_at = now;
                job.clone()
            }
            _ => return Ok(None),
        };

        let mut rejected = 0;
        let mut accepted = None;
        for other in tables.bids.values_mut().filter(|b| b.job_id == bid.job_id) {
            if other.id == bid.id {
                other.status = BidStatus::Accepted;
                other.updated_at = now;
                accepted = Some(other.clone());
            } else if other.status == BidStatus::Submitted {
                other.status = BidStatus::Rejected;
                other.updated_at = now;
                rejected += 1;
            }
        }

        Ok(accepted.map(|bid| AcceptedBid { bid, job, rejected }))
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn insert(&self, invoice: Invoice) -> AppResult<Invoice> {
        let mut tables = self.tables.write().await;
        if tables
            .invoices
            .values()
            .any(|existing| existing.invoice_number == invoice.invoice_number)
        {
            return Err(AppError::Conflict("Invoice number already exists".to_string()));
        }
        tables.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn last_number_suffix(&self, prefix: &str) -> AppResult<u32> {
        let tables = self.tables.read().await;
        Ok(tables
            .invoices
            .values()
            .filter_map(|invoice| invoice.invoice_number.strip_prefix(prefix))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .max()
            .unwrap_or(0))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invoice>> {
        Ok(self.tables.read().await.invoices.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Invoice>> {
        let tables = self.tables.read().await;
        let mut invoices: Vec<Invoice> = tables.invoices.values().cloned().collect();
        invoices.sort_by(|a, b| {
            b.issue_date
                .cmp(&a.issue_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(invoices)
    }

    async fn update(&self, invoice: Invoice) -> AppResult<Option<Invoice>> {
        let mut tables = self.tables.write().await;
        match tables.invoices.get_mut(&invoice.id) {
            Some(stored) => {
                // invoice_number, job e issue_date no cambian tras la creación
                stored.customer_name = invoice.customer_name;
                stored.customer_email = invoice.customer_email;
                stored.customer_address = invoice.customer_address;
                stored.description = invoice.description;
                stored.net_amount = invoice.net_amount;
                stored.vat_rate = invoice.vat_rate;
                stored.vat_amount = invoice.vat_amount;
                stored.gross_amount = invoice.gross_amount;
                stored.payment_terms = invoice.payment_terms;
                stored.due_date = invoice.due_date;
                stored.payment_status = invoice.payment_status;
                stored.updated_at = Utc::now();
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn insert(&self, profile: Profile) -> AppResult<Profile> {
        let mut tables = self.tables.write().await;
        if tables
            .profiles
            .values()
            .any(|p| p.email.eq_ignore_ascii_case(&profile.email))
        {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> AppResult<Option<Profile>> {
        let mut tables = self.tables.write().await;
        Ok(tables.profiles.get_mut(&id).map(|profile| {
            profile.role = role;
            profile.clone()
        }))
    }
}

#[async_trait]
impl FleetRepository for MemoryStore {
    async fn insert_company(&self, company: Company) -> AppResult<Company> {
        let mut tables = self.tables.write().await;
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn find_company(&self, id: Uuid) -> AppResult<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn list_companies(&self) -> AppResult<Vec<Company>> {
        let tables = self.tables.read().await;
        let mut companies: Vec<Company> = tables.companies.values().cloned().collect();
        companies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(companies)
    }

    async fn set_company_status(
        &self,
        id: Uuid,
        status: RecordStatus,
        approved: Option<bool>,
    ) -> AppResult<Option<Company>> {
        let mut tables = self.tables.write().await;
        Ok(tables.companies.get_mut(&id).map(|company| {
            company.status = status;
            if let Some(approved) = approved {
                company.approved = approved;
            }
            company.clone()
        }))
    }

    async fn insert_driver(&self, driver: Driver) -> AppResult<Driver> {
        let mut tables = self.tables.write().await;
        tables.drivers.insert(driver.id, driver.clone());
        Ok(driver)
    }

    async fn list_drivers(&self, company_id: Option<Uuid>) -> AppResult<Vec<Driver>> {
        let tables = self.tables.read().await;
        let mut drivers: Vec<Driver> = tables
            .drivers
            .values()
            .filter(|d| company_id.map_or(true, |c| d.company_id == c))
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(drivers)
    }

    async fn set_driver_status(
        &self,
        id: Uuid,
        company_id: Option<Uuid>,
        status: RecordStatus,
    ) -> AppResult<Option<Driver>> {
        let mut tables = self.tables.write().await;
        match tables.drivers.get_mut(&id) {
            Some(driver) if company_id.map_or(true, |c| driver.company_id == c) => {
                driver.status = status;
                Ok(Some(driver.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn insert_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.vehicles.values().any(|v| {
            v.company_id == vehicle.company_id && v.registration == vehicle.registration
        });
        if duplicate {
            return Err(AppError::Conflict(
                "Registration already exists for this company".to_string(),
            ));
        }
        tables.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.tables.read().await.vehicles.get(&id).cloned())
    }

    async fn list_vehicles(&self, company_id: Option<Uuid>) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.read().await;
        let mut vehicles: Vec<Vehicle> = tables
            .vehicles
            .values()
            .filter(|v| company_id.map_or(true, |c| v.company_id == c))
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vehicles)
    }

    async fn delete_vehicle(&self, id: Uuid, company_id: Option<Uuid>) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .vehicles
            .get(&id)
            .map_or(false, |v| company_id.map_or(true, |c| v.company_id == c));
        if !owned {
            return Ok(false);
        }
        tables.vehicles.remove(&id);
        // ON DELETE CASCADE
        tables
            .documents
            .retain(|_, d| !(d.kind == DocumentKind::Vehicle && d.owner_id == id));
        Ok(true)
    }

    async fn insert_document(&self, document: Document) -> AppResult<Document> {
        let mut tables = self.tables.write().await;
        let owner_exists = match document.kind {
            DocumentKind::Driver => tables.drivers.contains_key(&document.owner_id),
            DocumentKind::Vehicle => tables.vehicles.contains_key(&document.owner_id),
        };
        if !owner_exists {
            return Err(AppError::BadRequest("Referenced record does not exist".to_string()));
        }
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn list_documents(&self, company_id: Option<Uuid>) -> AppResult<Vec<Document>> {
        let tables = self.tables.read().await;
        let mut documents: Vec<Document> = tables
            .documents
            .values()
            .filter(|d| company_id.map_or(true, |c| d.company_id == c))
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn set_document_status(
        &self,
        kind: DocumentKind,
        id: Uuid,
        status: DocumentStatus,
    ) -> AppResult<Option<Document>> {
        let mut tables = self.tables.write().await;
        match tables.documents.get_mut(&id) {
            Some(document) if document.kind == kind => {
                document.status = status;
                Ok(Some(document.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bid::NewBid;
    use crate::models::job::NewJob;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn new_job(company_id: Uuid, status: JobStatus) -> Job {
        NewJob {
            company_id,
            pickup_location: "Leeds".to_string(),
            pickup_postcode: None,
            pickup_city: None,
            delivery_location: "York".to_string(),
            delivery_postcode: None,
            delivery_city: None,
            pickup_at: Utc::now() + Duration::days(1),
            delivery_at: None,
            status,
            budget: Decimal::from(500),
            vehicle_type: "Luton Van".to_string(),
            weight_kg: None,
            pallets: None,
            dimensions: None,
            load_details: None,
            load_type: None,
            distance_miles: None,
        }
        .into_job(Utc::now())
    }

    fn new_bid(job_id: Uuid, company_id: Uuid, amount: i64) -> Bid {
        NewBid {
            job_id,
            bidder_company_id: company_id,
            bidder_user_id: Uuid::new_v4(),
            amount: Decimal::from(amount),
            message: None,
        }
        .into_bid(Utc::now())
    }

    #[tokio::test]
    async fn test_duplicate_live_bid_is_conflict() {
        let store = MemoryStore::new();
        let job = JobRepository::insert(&store, new_job(Uuid::new_v4(), JobStatus::Open))
            .await
            .unwrap();
        let bidder = Uuid::new_v4();

        BidRepository::insert(&store, new_bid(job.id, bidder, 450)).await.unwrap();
        let err = BidRepository::insert(&store, new_bid(job.id, bidder, 440))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(msg) if msg == ALREADY_BID));
    }

    #[tokio::test]
    async fn test_withdrawn_bid_allows_rebid() {
        let store = MemoryStore::new();
        let job = JobRepository::insert(&store, new_job(Uuid::new_v4(), JobStatus::Open))
            .await
            .unwrap();
        let bidder = Uuid::new_v4();

        let first = BidRepository::insert(&store, new_bid(job.id, bidder, 450)).await.unwrap();
        store
            .set_status(first.id, BidStatus::Submitted, BidStatus::Withdrawn)
            .await
            .unwrap();

        assert!(BidRepository::insert(&store, new_bid(job.id, bidder, 430)).await.is_ok());
    }

    #[tokio::test]
    async fn test_bid_on_draft_job_rejected() {
        let store = MemoryStore::new();
        let job = JobRepository::insert(&store, new_job(Uuid::new_v4(), JobStatus::Draft))
            .await
            .unwrap();

        let err = BidRepository::insert(&store, new_bid(job.id, Uuid::new_v4(), 300))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
    }

    #[tokio::test]
    async fn test_accept_assigns_job_and_rejects_others() {
        let store = MemoryStore::new();
        let job = JobRepository::insert(&store, new_job(Uuid::new_v4(), JobStatus::Open))
            .await
            .unwrap();
        let winner = BidRepository::insert(&store, new_bid(job.id, Uuid::new_v4(), 450))
            .await
            .unwrap();
        let loser = BidRepository::insert(&store, new_bid(job.id, Uuid::new_v4(), 480))
            .await
            .unwrap();

        let accepted = store.accept(winner.id).await.unwrap().unwrap();
        assert_eq!(accepted.bid.status, BidStatus::Accepted);
        assert_eq!(accepted.job.status, JobStatus::Assigned);
        assert_eq!(accepted.job.agreed_rate, Some(Decimal::from(450)));
        assert_eq!(accepted.rejected, 1);

        let loser = BidRepository::find_by_id(&store, loser.id).await.unwrap().unwrap();
        assert_eq!(loser.status, BidStatus::Rejected);

        // Segunda aceptación: el job ya no está open
        assert!(store.accept(loser.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_change_status_is_conditional() {
        let store = MemoryStore::new();
        let job = JobRepository::insert(&store, new_job(Uuid::new_v4(), JobStatus::Draft))
            .await
            .unwrap();

        let missed = store.change_status(job.id, StatusChange::to(JobStatus::InTransit)).await.unwrap();
        assert!(missed.is_none());

        let opened = store.change_status(job.id, StatusChange::to(JobStatus::Open)).await.unwrap();
        assert_eq!(opened.map(|j| j.status), Some(JobStatus::Open));
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let store = MemoryStore::new();
        let mut older = new_job(Uuid::new_v4(), JobStatus::Open);
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = new_job(Uuid::new_v4(), JobStatus::Open);

        JobRepository::insert(&store, older.clone()).await.unwrap();
        JobRepository::insert(&store, newer.clone()).await.unwrap();

        let ids: Vec<Uuid> = JobRepository::list_all(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
