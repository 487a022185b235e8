//! Servicio de Jobs
//!
//! Alta, publicación y cancelación de jobs, más las consultas de la lista
//! y de la bolsa pública. Toda transición de estado pasa por una escritura
//! condicional sobre el estado actual.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::JobBoardCache;
use crate::models::auth::{AuthUser, Role};
use crate::models::job::{Job, JobStatus, NewJob, StatusChange};
use crate::repositories::{JobRepository, Repositories};
use crate::services::job_query::JobQuery;
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::{positive_amount, validate_not_empty};

pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    board_cache: Option<JobBoardCache>,
}

impl JobService {
    pub fn new(repos: &Repositories, board_cache: Option<JobBoardCache>) -> Self {
        Self {
            jobs: repos.jobs.clone(),
            board_cache,
        }
    }

    pub async fn create(&self, user: &AuthUser, new_job: NewJob) -> AppResult<Job> {
        let on_behalf = matches!(user.role, Role::Admin | Role::Owner);
        if !on_behalf && user.company_id != Some(new_job.company_id) {
            return Err(forbidden_error("post job", "jobs are posted for your own company"));
        }

        if validate_not_empty(&new_job.pickup_location).is_err() {
            return Err(validation_error("pickup_location", "Pickup location is required"));
        }
        if validate_not_empty(&new_job.delivery_location).is_err() {
            return Err(validation_error("delivery_location", "Delivery location is required"));
        }
        if positive_amount(&new_job.budget).is_err() {
            return Err(validation_error("budget", "Budget must be greater than zero"));
        }
        if let Some(delivery_at) = new_job.delivery_at {
            if delivery_at < new_job.pickup_at {
                return Err(validation_error("delivery_at", "Delivery cannot be before pickup"));
            }
        }
        if !matches!(new_job.status, JobStatus::Draft | JobStatus::Open) {
            return Err(AppError::BadRequest("New jobs start as draft or open".to_string()));
        }

        let job = self.jobs.insert(new_job.into_job(chrono::Utc::now())).await?;
        info!(
            job_id = %job.id,
            company_id = %job.company_id,
            status = %job.status,
            "📦 Job creado: {} -> {}",
            job.pickup_location,
            job.delivery_location
        );

        self.invalidate_board().await;
        Ok(job)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Job> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Job", &id.to_string()))
    }

    /// Lista completa filtrada en memoria
    pub async fn list(&self, query: &JobQuery) -> AppResult<Vec<Job>> {
        let jobs = self.jobs.list_all().await?;
        Ok(query.apply(jobs))
    }

    pub async fn list_for_company(&self, company_id: Uuid, query: &JobQuery) -> AppResult<Vec<Job>> {
        let jobs = self.jobs.list_by_company(company_id).await?;
        Ok(query.apply(jobs))
    }

    /// Bolsa pública: solo jobs abiertos, servida desde cache si existe
    pub async fn board(&self, query: JobQuery) -> AppResult<Vec<Job>> {
        let query = query.board();

        let Some(cache) = &self.board_cache else {
            return self.list(&query).await;
        };

        // Misma clave para leer y guardar: fija la generación de esta consulta
        let key = cache.snapshot_key(&query).await;
        if let Some(jobs) = cache.get(&key).await {
            debug!("📥 Bolsa de cargas servida desde cache");
            return Ok(jobs);
        }

        let jobs = self.list(&query).await?;
        cache.put(&key, &jobs).await;
        Ok(jobs)
    }

    pub async fn publish(&self, user: &AuthUser, id: Uuid) -> AppResult<Job> {
        let job = self.get(id).await?;
        ensure_owner(user, &job, "publish job")?;
        self.transition(&job, StatusChange::to(JobStatus::Open)).await
    }

    pub async fn cancel(&self, user: &AuthUser, id: Uuid) -> AppResult<Job> {
        let job = self.get(id).await?;
        if user.role != Role::Owner {
            ensure_owner(user, &job, "cancel job")?;
        }
        self.transition(&job, StatusChange::to(JobStatus::Cancelled)).await
    }

    /// Aplica una transición validada contra la tabla del ciclo de vida
    pub async fn transition(&self, job: &Job, change: StatusChange) -> AppResult<Job> {
        let next = change.next;
        if !job.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Job cannot move from {} to {}",
                job.status, next
            )));
        }

        match self.jobs.change_status(job.id, change).await? {
            Some(updated) => {
                info!(job_id = %job.id, from = %job.status, to = %next, "🔄 Transición de job");
                self.invalidate_board().await;
                Ok(updated)
            }
            None => Err(AppError::Conflict(
                "Job status changed in the meantime; reload and try again".to_string(),
            )),
        }
    }

    pub async fn invalidate_board(&self) {
        if let Some(cache) = &self.board_cache {
            cache.invalidate().await;
        }
    }
}

/// El usuario pertenece a la empresa dueña del job (o es admin)
pub fn ensure_owner(user: &AuthUser, job: &Job, operation: &str) -> AppResult<()> {
    if user.is_admin() || job.is_owned_by(user.company_id) {
        Ok(())
    } else {
        Err(forbidden_error(operation, "you do not own this job"))
    }
}
