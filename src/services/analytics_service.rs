use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::analytics::{InvoiceSummary, PlatformSummary};
use crate::models::bid::{Bid, BidStatus};
use crate::models::invoice::{Invoice, PaymentStatus};
use crate::models::job::{Job, JobStatus};
use crate::repositories::{BidRepository, InvoiceRepository, JobRepository, Repositories};
use crate::utils::errors::AppResult;

/// Servicio de analytics del owner
pub struct AnalyticsService {
    jobs: Arc<dyn JobRepository>,
    bids: Arc<dyn BidRepository>,
    invoices: Arc<dyn InvoiceRepository>,
}

impl AnalyticsService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            jobs: repos.jobs.clone(),
            bids: repos.bids.clone(),
            invoices: repos.invoices.clone(),
        }
    }

    pub async fn summary(&self) -> AppResult<PlatformSummary> {
        let jobs = self.jobs.list_all().await?;
        let bids = self.bids.list_all().await?;
        let invoices = self.invoices.list_all().await?;

        Ok(summarize(&jobs, &bids, &invoices, Utc::now().date_naive()))
    }
}

pub fn summarize(jobs: &[Job], bids: &[Bid], invoices: &[Invoice], today: NaiveDate) -> PlatformSummary {
    let mut jobs_by_status: BTreeMap<&'static str, usize> =
        JobStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for job in jobs {
        *jobs_by_status.entry(job.status.as_str()).or_default() += 1;
    }

    let mut bids_by_status: BTreeMap<&'static str, usize> =
        BidStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for bid in bids {
        *bids_by_status.entry(bid.status.as_str()).or_default() += 1;
    }

    let accepted = bids_by_status[BidStatus::Accepted.as_str()];
    let decided = accepted + bids_by_status[BidStatus::Rejected.as_str()];
    let acceptance_rate = (decided > 0).then(|| {
        (Decimal::from(accepted) * Decimal::ONE_HUNDRED / Decimal::from(decided)).round_dp(1)
    });

    let completed_value = jobs
        .iter()
        .filter(|j| j.status == JobStatus::Completed)
        .map(|j| j.agreed_rate.unwrap_or(j.budget))
        .sum();

    let mut invoice_summary = InvoiceSummary::default();
    for invoice in invoices {
        invoice_summary.count += 1;
        invoice_summary.net_total += invoice.net_amount;
        invoice_summary.vat_total += invoice.vat_amount;
        invoice_summary.gross_total += invoice.gross_amount;

        if invoice.payment_status != PaymentStatus::Paid {
            invoice_summary.outstanding_gross += invoice.gross_amount;
            // Vencida por fecha aunque nadie la haya marcado
            if invoice.payment_status == PaymentStatus::Overdue || invoice.due_date < today {
                invoice_summary.overdue_count += 1;
            }
        }
    }

    PlatformSummary {
        total_jobs: jobs.len(),
        jobs_by_status,
        total_bids: bids.len(),
        bids_by_status,
        acceptance_rate,
        completed_value,
        invoices: invoice_summary,
    }
}
