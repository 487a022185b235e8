use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::bid::Bid;
use crate::models::job::Job;
use crate::repositories::AcceptedBid;
use crate::utils::validation::positive_amount;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitBidRequest {
    #[validate(custom = "positive_amount")]
    pub amount: Decimal,
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

// Response de aceptación: bid, job asignado y bids rechazados
#[derive(Debug, Serialize)]
pub struct AcceptBidResponse {
    pub bid: Bid,
    pub job: Job,
    pub rejected_bids: u64,
}

impl From<AcceptedBid> for AcceptBidResponse {
    fn from(accepted: AcceptedBid) -> Self {
        Self {
            bid: accepted.bid,
            job: accepted.job,
            rejected_bids: accepted.rejected,
        }
    }
}
