//! Modelo de Bid (presupuesto)
//!
//! Oferta de una empresa para realizar un Job a un precio dado.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Estado de un Bid - mapea a la columna job_bids.status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Submitted,
    Accepted,
    Rejected,
    Withdrawn,
}

impl BidStatus {
    pub const ALL: [BidStatus; 4] = [
        BidStatus::Submitted,
        BidStatus::Accepted,
        BidStatus::Rejected,
        BidStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Submitted => "submitted",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
            BidStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BidStatus::Submitted => "Submitted",
            BidStatus::Accepted => "Accepted",
            BidStatus::Rejected => "Rejected",
            BidStatus::Withdrawn => "Withdrawn",
        }
    }

    /// Un bid "vivo" bloquea un segundo bid de la misma empresa en el mismo job
    pub fn is_live(&self) -> bool {
        matches!(self, BidStatus::Submitted | BidStatus::Accepted)
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BidStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submitted" | "pending" => Ok(BidStatus::Submitted),
            "accepted" => Ok(BidStatus::Accepted),
            "rejected" | "declined" => Ok(BidStatus::Rejected),
            "withdrawn" => Ok(BidStatus::Withdrawn),
            other => Err(format!("unknown bid status '{}'", other)),
        }
    }
}

/// Acepta también el vocabulario antiguo (`pending`, `declined`)
impl<'de> Deserialize<'de> for BidStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Bid principal - mapea a la tabla job_bids
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bid {
    pub id: Uuid,
    pub job_id: Uuid,
    pub bidder_company_id: Uuid,
    pub bidder_user_id: Uuid,
    pub amount: Decimal,
    pub message: Option<String>,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos para insertar un Bid nuevo (siempre en `submitted`)
#[derive(Debug, Clone)]
pub struct NewBid {
    pub job_id: Uuid,
    pub bidder_company_id: Uuid,
    pub bidder_user_id: Uuid,
    pub amount: Decimal,
    pub message: Option<String>,
}

impl NewBid {
    pub fn into_bid(self, now: DateTime<Utc>) -> Bid {
        Bid {
            id: Uuid::new_v4(),
            job_id: self.job_id,
            bidder_company_id: self.bidder_company_id,
            bidder_user_id: self.bidder_user_id,
            amount: self.amount,
            message: self.message,
            status: BidStatus::Submitted,
            created_at: now,
            updated_at: now,
        }
    }
}
