//! Servicio de facturas
//!
//! Los importes derivados nunca llegan del cliente: se recalculan con
//! `InvoiceTotals::compute` en cada alta o modificación.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::business::{self, is_supported_vat_rate};
use crate::models::invoice::{Invoice, InvoiceTotals, PaymentStatus, PaymentTerms};
use crate::repositories::{InvoiceRepository, JobRepository, Repositories};
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::non_negative_amount;

/// Totales y vencimiento calculados sin persistir nada
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InvoicePreview {
    #[serde(flatten)]
    pub totals: InvoiceTotals,
    pub payment_terms: PaymentTerms,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Datos de alta de una factura
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub job_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub description: Option<String>,
    pub net_amount: Decimal,
    pub vat_rate: u32,
    pub payment_terms: PaymentTerms,
    pub issue_date: Option<NaiveDate>,
}

/// Cambios parciales; los campos ausentes se conservan
#[derive(Debug, Clone, Default)]
pub struct InvoiceChanges {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    pub description: Option<String>,
    pub net_amount: Option<Decimal>,
    pub vat_rate: Option<u32>,
    pub payment_terms: Option<PaymentTerms>,
    pub payment_status: Option<PaymentStatus>,
}

fn checked_rate(rate: u32) -> AppResult<Decimal> {
    if !is_supported_vat_rate(rate) {
        return Err(validation_error("vat_rate", "VAT rate must be 0, 5 or 20"));
    }
    Ok(Decimal::from(rate))
}

/// Intentos de numeración antes de rendirse ante inserciones concurrentes
const NUMBERING_ATTEMPTS: u32 = 8;

fn checked_net(net: Decimal) -> AppResult<Decimal> {
    if non_negative_amount(&net).is_err() {
        return Err(validation_error("net_amount", "Net amount cannot be negative"));
    }
    if net.normalize().scale() > 2 {
        return Err(validation_error("net_amount", "Net amount must be in whole pence"));
    }
    Ok(net)
}

pub fn preview(net_amount: Decimal, vat_rate: u32, terms: PaymentTerms, issue_date: NaiveDate) -> AppResult<InvoicePreview> {
    let totals = InvoiceTotals::compute(checked_net(net_amount)?, checked_rate(vat_rate)?);
    Ok(InvoicePreview {
        totals,
        payment_terms: terms,
        issue_date,
        due_date: terms.due_date(issue_date),
    })
}

pub fn invoice_number_prefix(issue_date: NaiveDate) -> String {
    format!("INV-{}-", issue_date.format("%Y%m%d"))
}

/// `INV-YYYYMMDD-NNNN`, secuencia diaria que empieza en 0001
pub fn generate_invoice_number(issue_date: NaiveDate, sequence: u32) -> String {
    format!("{}{:04}", invoice_number_prefix(issue_date), sequence)
}

pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl InvoiceService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            invoices: repos.invoices.clone(),
            jobs: repos.jobs.clone(),
        }
    }

    pub async fn create(&self, draft: InvoiceDraft) -> AppResult<Invoice> {
        if draft.customer_name.trim().is_empty() {
            return Err(validation_error("customer_name", "Customer name is required"));
        }

        let issue_date = draft.issue_date.unwrap_or_else(|| Utc::now().date_naive());
        let pricing = preview(draft.net_amount, draft.vat_rate, draft.payment_terms, issue_date)?;

        // La factura de un job hereda su prueba de entrega
        let (signature_url, photo_urls) = match draft.job_id {
            Some(job_id) => {
                let job = self
                    .jobs
                    .find_by_id(job_id)
                    .await?
                    .ok_or_else(|| not_found_error("Job", &job_id.to_string()))?;
                (job.signature_url, job.photo_urls)
            }
            None => (None, Vec::new()),
        };

        let now = Utc::now();
        let mut invoice = Invoice {
            id: Uuid::new_v4(),
            invoice_number: String::new(),
            job_id: draft.job_id,
            customer_name: draft.customer_name.trim().to_string(),
            customer_email: draft.customer_email,
            customer_address: draft.customer_address,
            description: draft.description,
            net_amount: Decimal::ZERO,
            vat_rate: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            gross_amount: Decimal::ZERO,
            payment_terms: pricing.payment_terms,
            issue_date,
            due_date: issue_date,
            payment_status: PaymentStatus::Unpaid,
            signature_url,
            photo_urls,
            created_at: now,
            updated_at: now,
        };
        invoice.apply_pricing(pricing.totals, pricing.payment_terms);

        let invoice = self.insert_numbered(invoice).await?;
        info!(
            invoice_id = %invoice.id,
            gross = %invoice.gross_amount,
            "🧾 Factura {} emitida para {}",
            invoice.invoice_number,
            invoice.customer_name
        );
        Ok(invoice)
    }

    /// Asigna el siguiente número del día; si otra alta se lo lleva antes,
    /// vuelve a leer la secuencia
    async fn insert_numbered(&self, mut invoice: Invoice) -> AppResult<Invoice> {
        let prefix = invoice_number_prefix(invoice.issue_date);
        let mut attempt = 1;
        loop {
            let next = self.invoices.last_number_suffix(&prefix).await? + 1;
            invoice.invoice_number = generate_invoice_number(invoice.issue_date, next);

            match self.invoices.insert(invoice.clone()).await {
                Err(AppError::Conflict(_)) if attempt < NUMBERING_ATTEMPTS => {
                    warn!("⚠️ Número {} ya emitido, reintentando ({}/{})", invoice.invoice_number, attempt, NUMBERING_ATTEMPTS);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Invoice> {
        self.invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Invoice", &id.to_string()))
    }

    pub async fn list(&self) -> AppResult<Vec<Invoice>> {
        self.invoices.list_all().await
    }

    pub async fn update(&self, id: Uuid, changes: InvoiceChanges) -> AppResult<Invoice> {
        let mut invoice = self.get(id).await?;

        if let Some(name) = changes.customer_name {
            if name.trim().is_empty() {
                return Err(validation_error("customer_name", "Customer name is required"));
            }
            invoice.customer_name = name.trim().to_string();
        }
        if changes.customer_email.is_some() {
            invoice.customer_email = changes.customer_email;
        }
        if changes.customer_address.is_some() {
            invoice.customer_address = changes.customer_address;
        }
        if changes.description.is_some() {
            invoice.description = changes.description;
        }
        if let Some(status) = changes.payment_status {
            invoice.payment_status = status;
        }

        let net = match changes.net_amount {
            Some(net) => checked_net(net)?,
            None => invoice.net_amount,
        };
        let rate = match changes.vat_rate {
            Some(rate) => checked_rate(rate)?,
            None => invoice.vat_rate,
        };
        let terms = changes.payment_terms.unwrap_or(invoice.payment_terms);
        invoice.apply_pricing(InvoiceTotals::compute(net, rate), terms);
        invoice.updated_at = Utc::now();

        let invoice = self
            .invoices
            .update(invoice)
            .await?
            .ok_or_else(|| not_found_error("Invoice", &id.to_string()))?;
        info!(invoice_id = %invoice.id, "✏️ Factura {} actualizada", invoice.invoice_number);
        Ok(invoice)
    }

    /// Documento HTML listo para imprimir
    pub async fn print(&self, id: Uuid) -> AppResult<String> {
        let invoice = self.get(id).await?;
        Ok(render_invoice_html(&invoice))
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn money(value: Decimal) -> String {
    format!("£{:.2}", value)
}

pub fn render_invoice_html(invoice: &Invoice) -> String {
    let company = business::company_identity();
    let optional = |v: &Option<String>| v.as_deref().map(escape_html).unwrap_or_default();

    let pod = match &invoice.signature_url {
        Some(url) => {
            let photos: String = invoice
                .photo_urls
                .iter()
                .map(|p| format!("<img class=\"photo\" src=\"{}\" alt=\"Delivery photo\">", escape_html(p)))
                .collect();
            format!(
                "<section class=\"pod\"><h2>Proof of delivery</h2><img class=\"signature\" src=\"{}\" alt=\"Signature\">{}</section>",
                escape_html(url),
                photos
            )
        }
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Invoice {number}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 40px; color: #222; }}
table {{ width: 100%; border-collapse: collapse; margin-top: 24px; }}
td, th {{ border-bottom: 1px solid #ddd; padding: 8px; text-align: left; }}
.totals td {{ text-align: right; }}
.photo {{ max-width: 180px; margin: 4px; }}
.signature {{ max-width: 240px; }}
@media print {{ body {{ margin: 0; }} }}
</style>
</head>
<body>
<header>
<h1>{company_name}</h1>
<p>{company_address}<br>{company_email} | {company_phone}</p>
<p>Company No. {company_number} | VAT {vat_number}</p>
</header>
<section>
<h2>Invoice {number}</h2>
<p>Issue date: {issue}<br>Due date: {due} ({terms})<br>Status: {status}</p>
<p><strong>Bill to:</strong><br>{customer}<br>{customer_address}<br>{customer_email}</p>
</section>
<table>
<tr><th>Description</th><th>Net</th></tr>
<tr><td>{description}</td><td>{net}</td></tr>
</table>
<table class="totals">
<tr><td>Net</td><td>{net}</td></tr>
<tr><td>VAT ({rate}%)</td><td>{vat}</td></tr>
<tr><td><strong>Total</strong></td><td><strong>{gross}</strong></td></tr>
</table>
<p>Payment to {bank}, sort code {sort_code}, account {account}</p>
{pod}
</body>
</html>
"#,
        number = escape_html(&invoice.invoice_number),
        company_name = company.name,
        company_address = company.address,
        company_email = company.email,
        company_phone = company.phone,
        company_number = company.company_number,
        vat_number = company.vat_number,
        issue = invoice.issue_date.format("%d/%m/%Y"),
        due = invoice.due_date.format("%d/%m/%Y"),
        terms = invoice.payment_terms.label(),
        status = invoice.payment_status.as_str(),
        customer = escape_html(&invoice.customer_name),
        customer_address = optional(&invoice.customer_address),
        customer_email = optional(&invoice.customer_email),
        description = optional(&invoice.description),
        net = money(invoice.net_amount),
        rate = invoice.vat_rate.normalize(),
        vat = money(invoice.vat_amount),
        gross = money(invoice.gross_amount),
        bank = company.bank_name,
        sort_code = company.sort_code,
        account = company.account_number,
        pod = pod,
    )
}
