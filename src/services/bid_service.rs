use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::cache::JobBoardCache;
use crate::models::auth::AuthUser;
use crate::models::bid::{Bid, BidStatus, NewBid};
use crate::models::job::{Job, JobStatus};
use crate::repositories::{AcceptedBid, BidRepository, JobRepository, Repositories};
use crate::services::job_service::ensure_owner;
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::positive_amount;

/// Servicio de Bids
pub struct BidService {
    jobs: Arc<dyn JobRepository>,
    bids: Arc<dyn BidRepository>,
    board_cache: Option<JobBoardCache>,
}

impl BidService {
    pub fn new(repos: &Repositories, board_cache: Option<JobBoardCache>) -> Self {
        Self {
            jobs: repos.jobs.clone(),
            bids: repos.bids.clone(),
            board_cache,
        }
    }

    async fn job(&self, job_id: Uuid) -> AppResult<Job> {
        self.jobs
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| not_found_error("Job", &job_id.to_string()))
    }

    async fn bid(&self, bid_id: Uuid) -> AppResult<Bid> {
        self.bids
            .find_by_id(bid_id)
            .await?
            .ok_or_else(|| not_found_error("Bid", &bid_id.to_string()))
    }

    /// Envía un bid; el duplicado lo rechaza el almacenamiento, no una consulta previa
    pub async fn submit(
        &self,
        user: &AuthUser,
        job_id: Uuid,
        amount: rust_decimal::Decimal,
        message: Option<String>,
    ) -> AppResult<Bid> {
        let company_id = user
            .company_id
            .ok_or_else(|| forbidden_error("bid", "your account is not linked to a company"))?;

        if positive_amount(&amount).is_err() {
            return Err(validation_error("amount", "Bid amount must be greater than zero"));
        }

        let job = self.job(job_id).await?;
        if job.company_id == company_id {
            return Err(forbidden_error("bid", "you cannot bid on your own job"));
        }
        if job.status != JobStatus::Open {
            return Err(AppError::Conflict("Job is not open for bidding".to_string()));
        }

        let new_bid = NewBid {
            job_id,
            bidder_company_id: company_id,
            bidder_user_id: user.user_id,
            amount,
            message: message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty()),
        };
        let bid = self.bids.insert(new_bid.into_bid(Utc::now())).await?;

        info!(
            bid_id = %bid.id,
            job_id = %job_id,
            company_id = %company_id,
            "💷 Bid enviado por {}",
            bid.amount
        );
        Ok(bid)
    }

    /// Bids de un job; solo para la empresa dueña
    pub async fn list_for_job(&self, user: &AuthUser, job_id: Uuid) -> AppResult<Vec<Bid>> {
        let job = self.job(job_id).await?;
        ensure_owner(user, &job, "view bids")?;
        self.bids.list_by_job(job_id).await
    }

    pub async fn list_mine(&self, user: &AuthUser) -> AppResult<Vec<Bid>> {
        match user.company_id {
            Some(company_id) => self.bids.list_by_company(company_id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn accept(&self, user: &AuthUser, bid_id: Uuid) -> AppResult<AcceptedBid> {
        let bid = self.bid(bid_id).await?;
        let job = self.job(bid.job_id).await?;

        if !job.is_owned_by(user.company_id) {
            return Err(forbidden_error("accept bid", "only the job owner can accept bids"));
        }
        if bid.status != BidStatus::Submitted {
            return Err(AppError::Conflict(format!("Bid is already {}", bid.status)));
        }
        if job.status != JobStatus::Open {
            return Err(AppError::Conflict(format!(
                "Job cannot move from {} to {}",
                job.status,
                JobStatus::Assigned
            )));
        }

        let accepted = self.bids.accept(bid_id).await?.ok_or_else(|| {
            AppError::Conflict("Bid or job changed in the meantime; reload and try again".to_string())
        })?;

        info!(
            bid_id = %bid_id,
            job_id = %accepted.job.id,
            rejected = accepted.rejected,
            "🤝 Bid aceptado, job asignado por {}",
            accepted.bid.amount
        );

        if let Some(cache) = &self.board_cache {
            cache.invalidate().await;
        }
        Ok(accepted)
    }

    pub async fn reject(&self, user: &AuthUser, bid_id: Uuid) -> AppResult<Bid> {
        let bid = self.bid(bid_id).await?;
        let job = self.job(bid.job_id).await?;

        if !job.is_owned_by(user.company_id) {
            return Err(forbidden_error("reject bid", "only the job owner can reject bids"));
        }
        self.move_bid(&bid, BidStatus::Rejected).await
    }

    pub async fn withdraw(&self, user: &AuthUser, bid_id: Uuid) -> AppResult<Bid> {
        let bid = self.bid(bid_id).await?;
        if user.company_id != Some(bid.bidder_company_id) {
            return Err(forbidden_error("withdraw bid", "only the bidding company can withdraw"));
        }
        self.move_bid(&bid, BidStatus::Withdrawn).await
    }

    async fn move_bid(&self, bid: &Bid, next: BidStatus) -> AppResult<Bid> {
        if bid.status != BidStatus::Submitted {
            return Err(AppError::Conflict(format!("Bid is already {}", bid.status)));
        }

        let updated = self
            .bids
            .set_status(bid.id, BidStatus::Submitted, next)
            .await?
            .ok_or_else(|| AppError::Conflict("Bid changed in the meantime; reload and try again".to_string()))?;

        info!(bid_id = %bid.id, status = %next, "🔄 Bid actualizado");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use crate::models::job::NewJob;
    use chrono::Duration;
    use rust_decimal::Decimal;

    struct Fixture {
        service: BidService,
        poster: AuthUser,
        job: Job,
    }

    fn member(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: "member@example.com".to_string(),
            role,
            company_id: Some(Uuid::new_v4()),
        }
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::memory();
        let poster = member(Role::Company);
        let job = NewJob {
            company_id: poster.company_id.unwrap(),
            pickup_location: "Hull".to_string(),
            pickup_postcode: None,
            pickup_city: None,
            delivery_location: "Derby".to_string(),
            delivery_postcode: None,
            delivery_city: None,
            pickup_at: Utc::now() + Duration::days(2),
            delivery_at: None,
            status: JobStatus::Open,
            budget: Decimal::from(500),
            vehicle_type: "artic".to_string(),
            weight_kg: None,
            pallets: Some(4),
            dimensions: None,
            load_details: None,
            load_type: None,
            distance_miles: None,
        }
        .into_job(Utc::now());
        let job = repos.jobs.insert(job).await.unwrap();

        Fixture {
            service: BidService::new(&repos, None),
            poster,
            job,
        }
    }

    #[tokio::test]
    async fn test_owner_cannot_bid_on_own_job() {
        let f = fixture().await;
        let err = f
            .service
            .submit(&f.poster, f.job.id, Decimal::from(400), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .submit(&member(Role::Broker), f.job.id, Decimal::ZERO, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_second_live_bid_conflicts() {
        let f = fixture().await;
        let bidder = member(Role::Broker);
        f.service.submit(&bidder, f.job.id, Decimal::from(450), None).await.unwrap();

        let err = f
            .service
            .submit(&bidder, f.job.id, Decimal::from(440), None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        assert!(err.to_string().contains("already bid"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bids_from_one_company_keep_a_single_live_bid() {
        let f = fixture().await;
        let service = Arc::new(f.service);
        let company_id = Uuid::new_v4();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                let mut bidder = member(Role::Broker);
                bidder.company_id = Some(company_id);
                let job_id = f.job.id;
                tokio::spawn(async move {
                    service
                        .submit(&bidder, job_id, Decimal::from(400 + i), None)
                        .await
                })
            })
            .collect();

        let mut accepted = 0;
        let mut already_bid = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(AppError::Conflict(msg)) if msg == crate::repositories::ALREADY_BID => already_bid += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(already_bid, 15);
        assert_eq!(service.list_for_job(&f.poster, f.job.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_accept_is_owner_only_and_assigns_job() {
        let f = fixture().await;
        let bidder = member(Role::Driver);
        let rival = member(Role::Company);
        let bid = f.service.submit(&bidder, f.job.id, Decimal::from(450), None).await.unwrap();
        let other = f.service.submit(&rival, f.job.id, Decimal::from(470), None).await.unwrap();

        assert_eq!(f.service.accept(&bidder, bid.id).await.unwrap_err().code(), "FORBIDDEN");

        let accepted = f.service.accept(&f.poster, bid.id).await.unwrap();
        assert_eq!(accepted.bid.status, BidStatus::Accepted);
        assert_eq!(accepted.job.status, JobStatus::Assigned);
        assert_eq!(accepted.job.agreed_rate, Some(Decimal::from(450)));
        assert_eq!(accepted.rejected, 1);

        let bids = f.service.list_for_job(&f.poster, f.job.id).await.unwrap();
        let other = bids.iter().find(|b| b.id == other.id).unwrap();
        assert_eq!(other.status, BidStatus::Rejected);
    }

    #[tokio::test]
    async fn test_withdraw_only_by_bidder_and_once() {
        let f = fixture().await;
        let bidder = member(Role::Broker);
        let bid = f.service.submit(&bidder, f.job.id, Decimal::from(450), None).await.unwrap();

        assert_eq!(f.service.withdraw(&f.poster, bid.id).await.unwrap_err().code(), "FORBIDDEN");
        assert_eq!(f.service.withdraw(&bidder, bid.id).await.unwrap().status, BidStatus::Withdrawn);
        assert_eq!(f.service.withdraw(&bidder, bid.id).await.unwrap_err().code(), "CONFLICT");
    }

    #[tokio::test]
    async fn test_bids_visible_to_owner_only() {
        let f = fixture().await;
        let bidder = member(Role::Broker);
        f.service.submit(&bidder, f.job.id, Decimal::from(450), None).await.unwrap();

        assert_eq!(f.service.list_for_job(&f.poster, f.job.id).await.unwrap().len(), 1);
        assert_eq!(
            f.service.list_for_job(&bidder, f.job.id).await.unwrap_err().code(),
            "FORBIDDEN"
        );
        assert_eq!(f.service.list_mine(&bidder).await.unwrap().len(), 1);
    }
}
