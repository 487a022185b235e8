use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::AuthUser;
use crate::models::job::{JobStatus, LoadType, NewJob};
use crate::utils::validation::{positive_amount, validate_postcode};

// Request para publicar un job
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    /// Solo admin/owner publican en nombre de otra empresa
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub pickup_location: String,
    #[validate(custom = "validate_postcode")]
    pub pickup_postcode: Option<String>,
    pub pickup_city: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub delivery_location: String,
    #[validate(custom = "validate_postcode")]
    pub delivery_postcode: Option<String>,
    pub delivery_city: Option<String>,
    pub pickup_at: DateTime<Utc>,
    pub delivery_at: Option<DateTime<Utc>>,
    #[validate(custom = "positive_amount")]
    pub budget: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub vehicle_type: String,
    pub weight_kg: Option<Decimal>,
    #[validate(range(min = 0, max = 60))]
    pub pallets: Option<i32>,
    pub dimensions: Option<String>,
    pub load_details: Option<String>,
    pub load_type: Option<LoadType>,
    pub distance_miles: Option<Decimal>,
    /// Guardar como borrador en vez de publicar
    #[serde(default)]
    pub draft: bool,
}

impl CreateJobRequest {
    /// `None` si no hay empresa a la que asignar el job
    pub fn into_new_job(self, user: &AuthUser) -> Option<NewJob> {
        let company_id = self.company_id.or(user.company_id)?;
        Some(NewJob {
            company_id,
            pickup_location: self.pickup_location.trim().to_string(),
            pickup_postcode: self.pickup_postcode.map(|p| p.trim().to_uppercase()),
            pickup_city: self.pickup_city,
            delivery_location: self.delivery_location.trim().to_string(),
            delivery_postcode: self.delivery_postcode.map(|p| p.trim().to_uppercase()),
            delivery_city: self.delivery_city,
            pickup_at: self.pickup_at,
            delivery_at: self.delivery_at,
            status: if self.draft { JobStatus::Draft } else { JobStatus::Open },
            budget: self.budget,
            vehicle_type: self.vehicle_type.trim().to_string(),
            weight_kg: self.weight_kg,
            pallets: self.pallets,
            dimensions: self.dimensions,
            load_details: self.load_details,
            load_type: self.load_type,
            distance_miles: self.distance_miles,
        })
    }
}
