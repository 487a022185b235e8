//! Modelo de Company
//!
//! Empresa cliente o transportista. Sin comportamiento más allá del
//! cambio de estado y la aprobación por un admin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Estado activo/inactivo compartido por empresas y conductores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(RecordStatus::Active),
            "inactive" | "suspended" => Ok(RecordStatus::Inactive),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Company principal - mapea a la tabla companies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: RecordStatus,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: String, email: Option<String>, phone: Option<String>, address: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            address,
            status: RecordStatus::Active,
            approved: false,
            created_at: Utc::now(),
        }
    }
}
