use serde::Deserialize;
use validator::Validate;

use crate::services::delivery_service::{DelayReport, DeliveryConfirmation};
use crate::utils::validation::validate_phone;

#[derive(Debug, Default, Deserialize)]
pub struct PickupRequest {
    pub vehicle_type: Option<String>,
}

/// Firma y fotos en base64 o data URL; la obligatoriedad la decide el servicio
#[derive(Debug, Deserialize, Validate)]
pub struct DeliverRequest {
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 photos per delivery"))]
    pub photos: Vec<String>,
}

impl From<DeliverRequest> for DeliveryConfirmation {
    fn from(request: DeliverRequest) -> Self {
        Self {
            recipient_name: request.recipient_name,
            signature: request.signature,
            photos: request.photos,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DelayRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    #[validate(range(min = 1, max = 1440))]
    pub eta_minutes: Option<u32>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
}

impl From<DelayRequest> for DelayReport {
    fn from(request: DelayRequest) -> Self {
        Self {
            reason: request.reason,
            eta_minutes: request.eta_minutes,
            phone: request.phone,
        }
    }
}
