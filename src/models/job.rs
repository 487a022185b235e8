//! Modelo de Job
//!
//! Un Job es un movimiento de carga publicado por una empresa. El estado usa
//! un único vocabulario canónico; los alias históricos (`posted`,
//! `in-transit`, `delivered`, ...) solo se aceptan en la frontera de entrada.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Estado canónico de un Job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Open,
    Assigned,
    InTransit,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Draft,
        JobStatus::Open,
        JobStatus::Assigned,
        JobStatus::InTransit,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Open => "open",
            JobStatus::Assigned => "assigned",
            JobStatus::InTransit => "in_transit",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Draft => "Draft",
            JobStatus::Open => "Open",
            JobStatus::Assigned => "Assigned",
            JobStatus::InTransit => "In Transit",
            JobStatus::Completed => "Delivered",
            JobStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// Reglas de transición del ciclo de vida; nunca hacia atrás
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (Draft, Open) => true,
            (Open, Assigned) => true,
            (Assigned, InTransit) => true,
            (InTransit, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Estados desde los que se puede llegar a `next`
    pub fn predecessors_of(next: JobStatus) -> Vec<JobStatus> {
        JobStatus::ALL
            .iter()
            .copied()
            .filter(|from| from.can_transition_to(next))
            .collect()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(JobStatus::Draft),
            "open" | "posted" => Ok(JobStatus::Open),
            "assigned" | "allocated" => Ok(JobStatus::Assigned),
            "in_transit" | "in-transit" | "intransit" => Ok(JobStatus::InTransit),
            "completed" | "delivered" => Ok(JobStatus::Completed),
            "cancelled" | "canceled" => Ok(JobStatus::Cancelled),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Sub-clasificación opcional de los jobs abiertos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadType {
    OnDemand,
    Regular,
    DailyHire,
}

impl LoadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadType::OnDemand => "on-demand",
            LoadType::Regular => "regular",
            LoadType::DailyHire => "daily-hire",
        }
    }
}

impl FromStr for LoadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "on-demand" | "ondemand" => Ok(LoadType::OnDemand),
            "regular" => Ok(LoadType::Regular),
            "daily-hire" | "dailyhire" => Ok(LoadType::DailyHire),
            other => Err(format!("unknown load type '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for LoadType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Job principal - mapea a la tabla jobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub company_id: Uuid,
    pub pickup_location: String,
    pub pickup_postcode: Option<String>,
    pub pickup_city: Option<String>,
    pub delivery_location: String,
    pub delivery_postcode: Option<String>,
    pub delivery_city: Option<String>,
    pub pickup_at: DateTime<Utc>,
    pub delivery_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub budget: Decimal,
    pub agreed_rate: Option<Decimal>,
    pub vehicle_type: String,
    pub assigned_vehicle_type: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub pallets: Option<i32>,
    pub dimensions: Option<String>,
    pub load_details: Option<String>,
    pub load_type: Option<LoadType>,
    pub distance_miles: Option<Decimal>,
    pub recipient_name: Option<String>,
    pub signature_url: Option<String>,
    pub photo_urls: Vec<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn pickup_date(&self) -> NaiveDate {
        self.pickup_at.date_naive()
    }

    pub fn is_owned_by(&self, company_id: Option<Uuid>) -> bool {
        company_id == Some(self.company_id)
    }
}

/// Datos para insertar un Job nuevo
#[derive(Debug, Clone)]
pub struct NewJob {
    pub company_id: Uuid,
    pub pickup_location: String,
    pub pickup_postcode: Option<String>,
    pub pickup_city: Option<String>,
    pub delivery_location: String,
    pub delivery_postcode: Option<String>,
    pub delivery_city: Option<String>,
    pub pickup_at: DateTime<Utc>,
    pub delivery_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub budget: Decimal,
    pub vehicle_type: String,
    pub weight_kg: Option<Decimal>,
    pub pallets: Option<i32>,
    pub dimensions: Option<String>,
    pub load_details: Option<String>,
    pub load_type: Option<LoadType>,
    pub distance_miles: Option<Decimal>,
}

impl NewJob {
    pub fn into_job(self, now: DateTime<Utc>) -> Job {
        Job {
            id: Uuid::new_v4(),
            company_id: self.company_id,
            pickup_location: self.pickup_location,
            pickup_postcode: self.pickup_postcode,
            pickup_city: self.pickup_city,
            delivery_location: self.delivery_location,
            delivery_postcode: self.delivery_postcode,
            delivery_city: self.delivery_city,
            pickup_at: self.pickup_at,
            delivery_at: self.delivery_at,
            status: self.status,
            budget: self.budget,
            agreed_rate: None,
            vehicle_type: self.vehicle_type,
            assigned_vehicle_type: None,
            weight_kg: self.weight_kg,
            pallets: self.pallets,
            dimensions: self.dimensions,
            load_details: self.load_details,
            load_type: self.load_type,
            distance_miles: self.distance_miles,
            recipient_name: None,
            signature_url: None,
            photo_urls: Vec::new(),
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Cambio de estado condicional: solo se aplica si el estado actual está en `expected`
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub expected: Vec<JobStatus>,
    pub next: JobStatus,
    pub assigned_vehicle_type: Option<String>,
    pub proof: Option<ProofOfDelivery>,
}

impl StatusChange {
    pub fn to(next: JobStatus) -> Self {
        Self {
            expected: JobStatus::predecessors_of(next),
            next,
            assigned_vehicle_type: None,
            proof: None,
        }
    }
}

/// Prueba de entrega ya subida a object storage
#[derive(Debug, Clone, PartialEq)]
pub struct ProofOfDelivery {
    pub recipient_name: String,
    pub signature_url: String,
    pub photo_urls: Vec<String>,
    pub delivered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_collapse_to_canonical() {
        assert_eq!("posted".parse::<JobStatus>(), Ok(JobStatus::Open));
        assert_eq!("in-transit".parse::<JobStatus>(), Ok(JobStatus::InTransit));
        assert_eq!("delivered".parse::<JobStatus>(), Ok(JobStatus::Completed));
        assert_eq!("allocated".parse::<JobStatus>(), Ok(JobStatus::Assigned));
        assert!("lost".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_serializes_canonical_name() {
        let status: JobStatus = serde_json::from_str("\"in-transit\"").unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"in_transit\"");
    }

    #[test]
    fn test_forward_transitions_only() {
        assert!(JobStatus::Open.can_transition_to(JobStatus::Assigned));
        assert!(JobStatus::InTransit.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Assigned.can_transition_to(JobStatus::Open));
        assert!(!JobStatus::Open.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn test_cancel_from_non_terminal_only() {
        assert!(JobStatus::Draft.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::InTransit.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::Cancelled));
        assert_eq!(
            JobStatus::predecessors_of(JobStatus::Cancelled),
            vec![JobStatus::Draft, JobStatus::Open, JobStatus::Assigned, JobStatus::InTransit]
        );
    }

    #[test]
    fn test_load_type_spellings() {
        assert_eq!("on_demand".parse::<LoadType>(), Ok(LoadType::OnDemand));
        assert_eq!("Daily-Hire".parse::<LoadType>(), Ok(LoadType::DailyHire));
    }
}
