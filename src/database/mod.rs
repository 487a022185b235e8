//! Módulo de base de datos
//!
//! Conexión a PostgreSQL y migraciones embebidas.

use sqlx::PgPool;
use tracing::info;

use crate::config::database::{mask_database_url, DatabaseConfig};

/// Conectar y aplicar las migraciones pendientes
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    info!("🗄️ Conectando a {}", mask_database_url(&config.url));
    let pool = config.create_pool().await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("✅ Migraciones aplicadas");

    Ok(pool)
}
