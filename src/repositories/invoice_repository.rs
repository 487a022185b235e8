use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::InvoiceRepository;
use crate::models::invoice::Invoice;
use crate::utils::errors::{map_db_error, AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    invoice_number: String,
    job_id: Option<Uuid>,
    customer_name: String,
    customer_email: Option<String>,
    customer_address: Option<String>,
    description: Option<String>,
    net_amount: Decimal,
    vat_rate: Decimal,
    vat_amount: Decimal,
    gross_amount: Decimal,
    payment_terms: String,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    payment_status: String,
    signature_url: Option<String>,
    photo_urls: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = AppError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: row.id,
            invoice_number: row.invoice_number,
            job_id: row.job_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_address: row.customer_address,
            description: row.description,
            net_amount: row.net_amount,
            vat_rate: row.vat_rate,
            vat_amount: row.vat_amount,
            gross_amount: row.gross_amount,
            payment_terms: row.payment_terms.parse().map_err(AppError::Internal)?,
            issue_date: row.issue_date,
            due_date: row.due_date,
            payment_status: row.payment_status.parse().map_err(AppError::Internal)?,
            signature_url: row.signature_url,
            photo_urls: row.photo_urls,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgInvoiceRepository {
    pool: PgPool,
}

impl PgInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    async fn insert(&self, invoice: Invoice) -> AppResult<Invoice> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            INSERT INTO invoices (
                id, invoice_number, job_id, customer_name, customer_email, customer_address,
                description, net_amount, vat_rate, vat_amount, gross_amount, payment_terms,
                issue_date, due_date, payment_status, signature_url, photo_urls, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $18)
            RETURNING *
            "#,
        )
        .bind(invoice.id)
        .bind(&invoice.invoice_number)
        .bind(invoice.job_id)
        .bind(&invoice.customer_name)
        .bind(&invoice.customer_email)
        .bind(&invoice.customer_address)
        .bind(&invoice.description)
        .bind(invoice.net_amount)
        .bind(invoice.vat_rate)
        .bind(invoice.vat_amount)
        .bind(invoice.gross_amount)
        .bind(invoice.payment_terms.label())
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.payment_status.as_str())
        .bind(&invoice.signature_url)
        .bind(&invoice.photo_urls)
        .bind(invoice.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Invoice number already exists"))?;

        row.try_into()
    }

    async fn last_number_suffix(&self, prefix: &str) -> AppResult<u32> {
        let last = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT COALESCE(MAX(SUBSTRING(invoice_number FROM '([0-9]+)$')::INTEGER), 0)
            FROM invoices
            WHERE invoice_number LIKE $1
            "#,
        )
        .bind(format!("{}%", prefix))
        .fetch_one(&self.pool)
        .await?;

        Ok(u32::try_from(last).unwrap_or(0))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>("SELECT * FROM invoices ORDER BY issue_date DESC, created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn update(&self, invoice: Invoice) -> AppResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            UPDATE invoices
            SET customer_name = $2, customer_email = $3, customer_address = $4, description = $5,
                net_amount = $6, vat_rate = $7, vat_amount = $8, gross_amount = $9,
                payment_terms = $10, due_date = $11, payment_status = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(invoice.id)
        .bind(&invoice.customer_name)
        .bind(&invoice.customer_email)
        .bind(&invoice.customer_address)
        .bind(&invoice.description)
        .bind(invoice.net_amount)
        .bind(invoice.vat_rate)
        .bind(invoice.vat_amount)
        .bind(invoice.gross_amount)
        .bind(invoice.payment_terms.label())
        .bind(invoice.due_date)
        .bind(invoice.payment_status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Invoice::try_from).transpose()
    }
}
