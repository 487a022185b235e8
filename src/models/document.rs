//! Modelo de Document
//!
//! Documentación de cumplimiento de conductores (`driver_documents`) y
//! vehículos (`vehicle_documents`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// A quién pertenece el documento; decide la tabla
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Driver,
    Vehicle,
}

impl DocumentKind {
    pub fn table(&self) -> &'static str {
        match self {
            DocumentKind::Driver => "driver_documents",
            DocumentKind::Vehicle => "vehicle_documents",
        }
    }

    pub fn owner_column(&self) -> &'static str {
        match self {
            DocumentKind::Driver => "driver_id",
            DocumentKind::Vehicle => "vehicle_id",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "driver" | "drivers" => Ok(DocumentKind::Driver),
            "vehicle" | "vehicles" => Ok(DocumentKind::Vehicle),
            other => Err(format!("unknown document kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Expired => "expired",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DocumentStatus::Pending),
            "approved" => Ok(DocumentStatus::Approved),
            "rejected" => Ok(DocumentStatus::Rejected),
            "expired" => Ok(DocumentStatus::Expired),
            other => Err(format!("unknown document status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub owner_id: Uuid,
    pub company_id: Uuid,
    pub document_type: String,
    pub file_url: String,
    pub expires_on: Option<NaiveDate>,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Estado efectivo: un documento con fecha de caducidad pasada cuenta como `expired`
    pub fn effective_status(&self, today: NaiveDate) -> DocumentStatus {
        match self.expires_on {
            Some(expiry) if expiry < today => DocumentStatus::Expired,
            _ => self.status,
        }
    }
}
