use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::job_repository::JobRow;
use super::{AcceptedBid, BidRepository, ALREADY_BID};
use crate::models::bid::{Bid, BidStatus};
use crate::models::job::{Job, JobStatus};
use crate::utils::errors::{map_db_error, AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct BidRow {
    id: Uuid,
    job_id: Uuid,
    bidder_company_id: Uuid,
    bidder_user_id: Uuid,
    amount: Decimal,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BidRow> for Bid {
    type Error = AppError;

    fn try_from(row: BidRow) -> Result<Self, Self::Error> {
        Ok(Bid {
            id: row.id,
            job_id: row.job_id,
            bidder_company_id: row.bidder_company_id,
            bidder_user_id: row.bidder_user_id,
            amount: row.amount,
            message: row.message,
            status: row.status.parse().map_err(AppError::Internal)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn rows_to_bids(rows: Vec<BidRow>) -> AppResult<Vec<Bid>> {
    rows.into_iter().map(Bid::try_from).collect()
}

pub struct PgBidRepository {
    pool: PgPool,
}

impl PgBidRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BidRepository for PgBidRepository {
    async fn insert(&self, bid: Bid) -> AppResult<Bid> {
        // El índice único parcial uq_job_bids_live hace cumplir "un bid vivo por empresa"
        let row = sqlx::query_as::<_, BidRow>(
            r#"
            INSERT INTO job_bids (id, job_id, bidder_company_id, bidder_user_id, amount, message, status, created_at, updated_at)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $8
            WHERE EXISTS (SELECT 1 FROM jobs WHERE id = $2 AND status = 'open')
            RETURNING *
            "#,
        )
        .bind(bid.id)
        .bind(bid.job_id)
        .bind(bid.bidder_company_id)
        .bind(bid.bidder_user_id)
        .bind(bid.amount)
        .bind(&bid.message)
        .bind(bid.status.as_str())
        .bind(bid.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, ALREADY_BID))?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::Conflict("Job is not open for bidding".to_string())),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Bid>> {
        let row = sqlx::query_as::<_, BidRow>("SELECT * FROM job_bids WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Bid::try_from).transpose()
    }

    async fn list_by_job(&self, job_id: Uuid) -> AppResult<Vec<Bid>> {
        let rows = sqlx::query_as::<_, BidRow>(
            "SELECT * FROM job_bids WHERE job_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        rows_to_bids(rows)
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Bid>> {
        let rows = sqlx::query_as::<_, BidRow>(
            "SELECT * FROM job_bids WHERE bidder_company_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows_to_bids(rows)
    }

    async fn list_all(&self) -> AppResult<Vec<Bid>> {
        let rows = sqlx::query_as::<_, BidRow>("SELECT * FROM job_bids ORDER BY created_at DESC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows_to_bids(rows)
    }

    async fn set_status(&self, id: Uuid, expected: BidStatus, next: BidStatus) -> AppResult<Option<Bid>> {
        let row = sqlx::query_as::<_, BidRow>(
            r#"
            UPDATE job_bids
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Bid::try_from).transpose()
    }

    async fn accept(&self, bid_id: Uuid) -> AppResult<Option<AcceptedBid>> {
        let mut tx = self.pool.begin().await?;

        let bid_row = sqlx::query_as::<_, BidRow>("SELECT * FROM job_bids WHERE id = $1 FOR UPDATE")
            .bind(bid_id)
            .fetch_optional(&mut *tx)
            .await?;

        let bid: Bid = match bid_row {
            Some(row) => row.try_into()?,
            None => return Ok(None),
        };
        if bid.status != BidStatus::Submitted {
            return Ok(None);
        }

        // Compare-and-swap sobre el estado del job
        let job_row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = $3, agreed_rate = $4, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(bid.job_id)
        .bind(JobStatus::Open.as_str())
        .bind(JobStatus::Assigned.as_str())
        .bind(bid.amount)
        .fetch_optional(&mut *tx)
        .await?;

        let job: Job = match job_row {
            Some(row) => row.try_into()?,
            None => return Ok(None),
        };

        let accepted: Bid = sqlx::query_as::<_, BidRow>(
            "UPDATE job_bids SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(bid.id)
        .bind(BidStatus::Accepted.as_str())
        .fetch_one(&mut *tx)
        .await?
        .try_into()?;

        let rejected = sqlx::query(
            r#"
            UPDATE job_bids
            SET status = $3, updated_at = NOW()
            WHERE job_id = $1 AND id <> $2 AND status = $4
            "#,
        )
        .bind(bid.job_id)
        .bind(bid.id)
        .bind(BidStatus::Rejected.as_str())
        .bind(BidStatus::Submitted.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(Some(AcceptedBid { bid: accepted, job, rejected }))
    }
}
