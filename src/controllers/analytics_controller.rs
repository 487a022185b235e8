use crate::dto::ApiResponse;
use crate::models::analytics::PlatformSummary;
use crate::services::analytics_service::AnalyticsService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AnalyticsController {
    service: AnalyticsService,
}

impl AnalyticsController {
    pub fn new(state: &AppState) -> AppResult<Self> {
        Ok(Self {
            service: AnalyticsService::new(state.repos()?),
        })
    }

    pub async fn summary(&self) -> AppResult<ApiResponse<PlatformSummary>> {
        Ok(ApiResponse::success(self.service.summary().await?))
    }
}
