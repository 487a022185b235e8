//! Modelos de Analytics
//!
//! Resumen de la plataforma para el panel del owner.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Resumen para el panel del owner
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlatformSummary {
    pub total_jobs: usize,
    pub jobs_by_status: BTreeMap<&'static str, usize>,
    pub total_bids: usize,
    pub bids_by_status: BTreeMap<&'static str, usize>,
    /// Bids aceptados sobre bids decididos (aceptados + rechazados)
    pub acceptance_rate: Option<Decimal>,
    pub completed_value: Decimal,
    pub invoices: InvoiceSummary,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct InvoiceSummary {
    pub count: usize,
    pub net_total: Decimal,
    pub vat_total: Decimal,
    pub gross_total: Decimal,
    pub outstanding_gross: Decimal,
    pub overdue_count: usize,
}
