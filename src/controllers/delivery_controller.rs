use uuid::Uuid;
use validator::Validate;

use crate::dto::delivery_dto::{DelayRequest, DeliverRequest, PickupRequest};
use crate::dto::ApiResponse;
use crate::models::auth::AuthUser;
use crate::models::job::Job;
use crate::services::delivery_service::{DelayNotice, DeliveryService};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct DeliveryController {
    service: DeliveryService,
}

impl DeliveryController {
    pub fn new(state: &AppState) -> AppResult<Self> {
        Ok(Self {
            service: DeliveryService::new(
                state.repos()?,
                state.board_cache.clone(),
                state.storage()?,
                state.config.dispatch_phone.clone(),
            ),
        })
    }

    pub async fn pickup(&self, user: &AuthUser, job_id: Uuid, request: PickupRequest) -> AppResult<ApiResponse<Job>> {
        let job = self.service.pickup(user, job_id, request.vehicle_type).await?;
        Ok(ApiResponse::success_with_message(job, "Pickup recorded"))
    }

    pub async fn deliver(&self, user: &AuthUser, job_id: Uuid, request: DeliverRequest) -> AppResult<ApiResponse<Job>> {
        request.validate()?;
        let job = self.service.complete(user, job_id, request.into()).await?;
        Ok(ApiResponse::success_with_message(job, "Delivery completed"))
    }

    pub async fn delay(&self, user: &AuthUser, job_id: Uuid, request: DelayRequest) -> AppResult<ApiResponse<DelayNotice>> {
        request.validate()?;
        Ok(ApiResponse::success(self.service.report_delay(user, job_id, request.into()).await?))
    }
}
