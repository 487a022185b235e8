use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::JobRepository;
use crate::models::job::{Job, JobStatus, LoadType, StatusChange};
use crate::utils::errors::{AppError, AppResult};

// Fila tal cual está en la tabla jobs
#[derive(Debug, sqlx::FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub pickup_location: String,
    pub pickup_postcode: Option<String>,
    pub pickup_city: Option<String>,
    pub delivery_location: String,
    pub delivery_postcode: Option<String>,
    pub delivery_city: Option<String>,
    pub pickup_at: DateTime<Utc>,
    pub delivery_at: Option<DateTime<Utc>>,
    pub status: String,
    pub budget: Decimal,
    pub agreed_rate: Option<Decimal>,
    pub vehicle_type: String,
    pub assigned_vehicle_type: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub pallets: Option<i32>,
    pub dimensions: Option<String>,
    pub load_details: Option<String>,
    pub load_type: Option<String>,
    pub distance_miles: Option<Decimal>,
    pub recipient_name: Option<String>,
    pub signature_url: Option<String>,
    pub photo_urls: Vec<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = AppError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status: JobStatus = row.status.parse().map_err(AppError::Internal)?;
        // Un load_type desconocido se trata como ausente
        let load_type = row.load_type.and_then(|raw| raw.parse::<LoadType>().ok());

        Ok(Job {
            id: row.id,
            company_id: row.company_id,
            pickup_location: row.pickup_location,
            pickup_postcode: row.pickup_postcode,
            pickup_city: row.pickup_city,
            delivery_location: row.delivery_location,
            delivery_postcode: row.delivery_postcode,
            delivery_city: row.delivery_city,
            pickup_at: row.pickup_at,
            delivery_at: row.delivery_at,
            status,
            budget: row.budget,
            agreed_rate: row.agreed_rate,
            vehicle_type: row.vehicle_type,
            assigned_vehicle_type: row.assigned_vehicle_type,
            weight_kg: row.weight_kg,
            pallets: row.pallets,
            dimensions: row.dimensions,
            load_details: row.load_details,
            load_type,
            distance_miles: row.distance_miles,
            recipient_name: row.recipient_name,
            signature_url: row.signature_url,
            photo_urls: row.photo_urls,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) fn rows_to_jobs(rows: Vec<JobRow>) -> AppResult<Vec<Job>> {
    rows.into_iter().map(Job::try_from).collect()
}

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn insert(&self, job: Job) -> AppResult<Job> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs (
                id, company_id, pickup_location, pickup_postcode, pickup_city,
                delivery_location, delivery_postcode, delivery_city, pickup_at, delivery_at,
                status, budget, vehicle_type, weight_kg, pallets, dimensions,
                load_details, load_type, distance_miles, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $20)
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(job.company_id)
        .bind(&job.pickup_location)
        .bind(&job.pickup_postcode)
        .bind(&job.pickup_city)
        .bind(&job.delivery_location)
        .bind(&job.delivery_postcode)
        .bind(&job.delivery_city)
        .bind(job.pickup_at)
        .bind(job.delivery_at)
        .bind(job.status.as_str())
        .bind(job.budget)
        .bind(&job.vehicle_type)
        .bind(job.weight_kg)
        .bind(job.pallets)
        .bind(&job.dimensions)
        .bind(&job.load_details)
        .bind(job.load_type.map(|t| t.as_str()))
        .bind(job.distance_miles)
        .bind(job.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Job::try_from).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows_to_jobs(rows)
    }

    async fn list_by_company(&self, company_id: Uuid) -> AppResult<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT * FROM jobs WHERE company_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows_to_jobs(rows)
    }

    async fn change_status(&self, id: Uuid, change: StatusChange) -> AppResult<Option<Job>> {
        let expected: Vec<String> = change.expected.iter().map(|s| s.as_str().to_string()).collect();
        let proof = change.proof;

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET status = $2,
                assigned_vehicle_type = COALESCE($4, assigned_vehicle_type),
                recipient_name = COALESCE($5, recipient_name),
                signature_url = COALESCE($6, signature_url),
                photo_urls = COALESCE($7, photo_urls),
                delivered_at = COALESCE($8, delivered_at),
                updated_at = NOW()
            WHERE id = $1 AND status = ANY($3)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(change.next.as_str())
        .bind(&expected)
        .bind(change.assigned_vehicle_type)
        .bind(proof.as_ref().map(|p| p.recipient_name.clone()))
        .bind(proof.as_ref().map(|p| p.signature_url.clone()))
        .bind(proof.as_ref().map(|p| p.photo_urls.clone()))
        .bind(proof.as_ref().map(|p| p.delivered_at))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }
}
