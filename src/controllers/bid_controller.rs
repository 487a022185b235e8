use uuid::Uuid;
use validator::Validate;

use crate::dto::bid_dto::{AcceptBidResponse, SubmitBidRequest};
use crate::dto::ApiResponse;
use crate::models::auth::AuthUser;
use crate::models::bid::Bid;
use crate::services::bid_service::BidService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct BidController {
    service: BidService,
}

impl BidController {
    pub fn new(state: &AppState) -> AppResult<Self> {
        Ok(Self {
            service: BidService::new(state.repos()?, state.board_cache.clone()),
        })
    }

    pub async fn submit(&self, user: &AuthUser, job_id: Uuid, request: SubmitBidRequest) -> AppResult<ApiResponse<Bid>> {
        request.validate()?;
        let bid = self.service.submit(user, job_id, request.amount, request.message).await?;
        Ok(ApiResponse::success_with_message(bid, "Bid submitted"))
    }

    pub async fn list_for_job(&self, user: &AuthUser, job_id: Uuid) -> AppResult<ApiResponse<Vec<Bid>>> {
        Ok(ApiResponse::success(self.service.list_for_job(user, job_id).await?))
    }

    pub async fn list_mine(&self, user: &AuthUser) -> AppResult<ApiResponse<Vec<Bid>>> {
        Ok(ApiResponse::success(self.service.list_mine(user).await?))
    }

    pub async fn accept(&self, user: &AuthUser, bid_id: Uuid) -> AppResult<ApiResponse<AcceptBidResponse>> {
        let accepted = self.service.accept(user, bid_id).await?;
        Ok(ApiResponse::success_with_message(accepted.into(), "Bid accepted"))
    }

    pub async fn reject(&self, user: &AuthUser, bid_id: Uuid) -> AppResult<ApiResponse<Bid>> {
        Ok(ApiResponse::success_with_message(self.service.reject(user, bid_id).await?, "Bid rejected"))
    }

    pub async fn withdraw(&self, user: &AuthUser, bid_id: Uuid) -> AppResult<ApiResponse<Bid>> {
        Ok(ApiResponse::success_with_message(self.service.withdraw(user, bid_id).await?, "Bid withdrawn"))
    }
}
