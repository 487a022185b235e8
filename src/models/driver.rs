//! Modelo de Driver

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::company::RecordStatus;

/// Conductor de una empresa - mapea a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    pub id: Uuid,
    pub company_id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub licence_number: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}
