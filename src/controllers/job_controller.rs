use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::job_dto::CreateJobRequest;
use crate::dto::ApiResponse;
use crate::models::auth::AuthUser;
use crate::models::job::{Job, JobStatus};
use crate::services::export_service::{export_filename, jobs_to_csv};
use crate::services::job_query::JobQuery;
use crate::services::job_service::JobService;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppResult};

pub struct JobController {
    service: JobService,
}

impl JobController {
    pub fn new(state: &AppState) -> AppResult<Self> {
        Ok(Self {
            service: JobService::new(state.repos()?, state.board_cache.clone()),
        })
    }

    pub async fn board(&self, query: JobQuery) -> AppResult<ApiResponse<Vec<Job>>> {
        Ok(ApiResponse::success(self.service.board(query).await?))
    }

    pub async fn list(&self, query: JobQuery) -> AppResult<ApiResponse<Vec<Job>>> {
        Ok(ApiResponse::success(self.service.list(&query).await?))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<Job>> {
        Ok(ApiResponse::success(self.service.get(id).await?))
    }

    pub async fn create(&self, user: &AuthUser, request: CreateJobRequest) -> AppResult<ApiResponse<Job>> {
        request.validate()?;
        let new_job = request
            .into_new_job(user)
            .ok_or_else(|| validation_error("company_id", "company_id is required"))?;

        let job = self.service.create(user, new_job).await?;
        let message = match job.status {
            JobStatus::Draft => "Job saved as draft",
            _ => "Job posted",
        };
        Ok(ApiResponse::success_with_message(job, message))
    }

    pub async fn publish(&self, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Job>> {
        Ok(ApiResponse::success_with_message(self.service.publish(user, id).await?, "Job published"))
    }

    pub async fn cancel(&self, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Job>> {
        Ok(ApiResponse::success_with_message(self.service.cancel(user, id).await?, "Job cancelled"))
    }

    /// (nombre de fichero, contenido CSV); usuarios de empresa exportan solo sus jobs
    pub async fn export(&self, user: &AuthUser, query: JobQuery) -> AppResult<(String, String)> {
        let jobs = match (user.role.is_company_scoped(), user.company_id) {
            (true, Some(company_id)) => self.service.list_for_company(company_id, &query).await?,
            (true, None) => Vec::new(),
            (false, _) => self.service.list(&query).await?,
        };
        Ok((export_filename(Utc::now().date_naive()), jobs_to_csv(&jobs)))
    }
}
