use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::FleetRepository;
use crate::models::company::{Company, RecordStatus};
use crate::models::document::{Document, DocumentKind, DocumentStatus};
use crate::models::driver::Driver;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{map_db_error, AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    status: String,
    approved: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = AppError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Ok(Company {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            status: row.status.parse().map_err(AppError::Internal)?,
            approved: row.approved,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: Uuid,
    company_id: Uuid,
    full_name: String,
    phone: Option<String>,
    email: Option<String>,
    licence_number: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DriverRow> for Driver {
    type Error = AppError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        Ok(Driver {
            id: row.id,
            company_id: row.company_id,
            full_name: row.full_name,
            phone: row.phone,
            email: row.email,
            licence_number: row.licence_number,
            status: row.status.parse().map_err(AppError::Internal)?,
            created_at: row.created_at,
        })
    }
}

// Struct simplificado para Vehicle
#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    company_id: Uuid,
    registration: String,
    vehicle_type: String,
    make: Option<String>,
    model: Option<String>,
    capacity_kg: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Vehicle {
            id: row.id,
            company_id: row.company_id,
            registration: row.registration,
            vehicle_type: row.vehicle_type,
            make: row.make,
            model: row.model,
            capacity_kg: row.capacity_kg,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    kind: String,
    id: Uuid,
    owner_id: Uuid,
    company_id: Uuid,
    document_type: String,
    file_url: String,
    expires_on: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            kind: row.kind.parse().map_err(AppError::Internal)?,
            owner_id: row.owner_id,
            company_id: row.company_id,
            document_type: row.document_type,
            file_url: row.file_url,
            expires_on: row.expires_on,
            status: row.status.parse().map_err(AppError::Internal)?,
            created_at: row.created_at,
        })
    }
}

fn document_columns(kind: DocumentKind) -> String {
    format!(
        "'{}' AS kind, id, {} AS owner_id, company_id, document_type, file_url, expires_on, status, created_at",
        match kind {
            DocumentKind::Driver => "driver",
            DocumentKind::Vehicle => "vehicle",
        },
        kind.owner_column()
    )
}

pub struct PgFleetRepository {
    pool: PgPool,
}

impl PgFleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FleetRepository for PgFleetRepository {
    async fn insert_company(&self, company: Company) -> AppResult<Company> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            INSERT INTO companies (id, name, email, phone, address, status, approved, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.phone)
        .bind(&company.address)
        .bind(company.status.as_str())
        .bind(company.approved)
        .bind(company.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Company already exists"))?;

        row.try_into()
    }

    async fn find_company(&self, id: Uuid) -> AppResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Company::try_from).transpose()
    }

    async fn list_companies(&self) -> AppResult<Vec<Company>> {
        let rows = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Company::try_from).collect()
    }

    async fn set_company_status(
        &self,
        id: Uuid,
        status: RecordStatus,
        approved: Option<bool>,
    ) -> AppResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            "UPDATE companies SET status = $2, approved = COALESCE($3, approved) WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Company::try_from).transpose()
    }

    async fn insert_driver(&self, driver: Driver) -> AppResult<Driver> {
        let row = sqlx::query_as::<_, DriverRow>(
            r#"
            INSERT INTO drivers (id, company_id, full_name, phone, email, licence_number, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(driver.id)
        .bind(driver.company_id)
        .bind(&driver.full_name)
        .bind(&driver.phone)
        .bind(&driver.email)
        .bind(&driver.licence_number)
        .bind(driver.status.as_str())
        .bind(driver.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Driver already exists"))?;

        row.try_into()
    }

    async fn list_drivers(&self, company_id: Option<Uuid>) -> AppResult<Vec<Driver>> {
        let rows = sqlx::query_as::<_, DriverRow>(
            "SELECT * FROM drivers WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY full_name",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Driver::try_from).collect()
    }

    async fn set_driver_status(
        &self,
        id: Uuid,
        company_id: Option<Uuid>,
        status: RecordStatus,
    ) -> AppResult<Option<Driver>> {
        let row = sqlx::query_as::<_, DriverRow>(
            r#"
            UPDATE drivers SET status = $3
            WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Driver::try_from).transpose()
    }

    async fn insert_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            INSERT INTO vehicles (id, company_id, registration, vehicle_type, make, model, capacity_kg, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.company_id)
        .bind(&vehicle.registration)
        .bind(&vehicle.vehicle_type)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.capacity_kg)
        .bind(vehicle.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Registration already exists for this company"))?;

        Ok(row.into())
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Vehicle::from))
    }

    async fn list_vehicles(&self, company_id: Option<Uuid>) -> AppResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            "SELECT * FROM vehicles WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Vehicle::from).collect())
    }

    async fn delete_vehicle(&self, id: Uuid, company_id: Option<Uuid>) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)")
            .bind(id)
            .bind(company_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_document(&self, document: Document) -> AppResult<Document> {
        let sql = format!(
            r#"
            INSERT INTO {table} (id, {owner}, company_id, document_type, file_url, expires_on, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {columns}
            "#,
            table = document.kind.table(),
            owner = document.kind.owner_column(),
            columns = document_columns(document.kind),
        );

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(document.id)
            .bind(document.owner_id)
            .bind(document.company_id)
            .bind(&document.document_type)
            .bind(&document.file_url)
            .bind(document.expires_on)
            .bind(document.status.as_str())
            .bind(document.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Document already exists"))?;

        row.try_into()
    }

    async fn list_documents(&self, company_id: Option<Uuid>) -> AppResult<Vec<Document>> {
        let sql = format!(
            r#"
            SELECT {driver_cols} FROM driver_documents WHERE ($1::uuid IS NULL OR company_id = $1)
            UNION ALL
            SELECT {vehicle_cols} FROM vehicle_documents WHERE ($1::uuid IS NULL OR company_id = $1)
            ORDER BY created_at DESC
            "#,
            driver_cols = document_columns(DocumentKind::Driver),
            vehicle_cols = document_columns(DocumentKind::Vehicle),
        );

        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    async fn set_document_status(
        &self,
        kind: DocumentKind,
        id: Uuid,
        status: DocumentStatus,
    ) -> AppResult<Option<Document>> {
        let sql = format!(
            "UPDATE {} SET status = $2 WHERE id = $1 RETURNING {}",
            kind.table(),
            document_columns(kind)
        );

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Document::try_from).transpose()
    }
}
