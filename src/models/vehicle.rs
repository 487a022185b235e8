//! Modelo de Vehicle
//!
//! Vehículo de la flota de una empresa. Mapea a la tabla vehicles.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub company_id: Uuid,
    pub registration: String,
    pub vehicle_type: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub capacity_kg: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}
