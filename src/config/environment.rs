//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. A diferencia de un
//! arranque estricto, la ausencia de credenciales del backing store no es
//! fatal: el servicio arranca en modo "no configurado".

use std::env;
use std::str::FromStr;

/// Backend de almacenamiento seleccionado con `STORE_BACKEND`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown STORE_BACKEND '{}'", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    // Object storage para fotos de entrega (bucket job-photos)
    pub storage_url: Option<String>,
    pub storage_api_key: Option<String>,
    pub dispatch_phone: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            jwt_secret: "dev-secret-change-in-production".to_string(),
            jwt_expiration: 86_400,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_origins: Vec::new(),
            rate_limit_requests: 120,
            rate_limit_window: 60,
            store_backend: StoreBackend::Postgres,
            database_url: None,
            redis_url: None,
            storage_url: None,
            storage_api_key: None,
            dispatch_phone: None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    match non_empty(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("⚠️ {} inválido ('{}'), usando valor por defecto", key, raw);
            default
        }),
        None => default,
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde variables de entorno
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let store_backend = match non_empty("STORE_BACKEND") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!("⚠️ {}, usando postgres", e);
                StoreBackend::Postgres
            }),
            None => StoreBackend::Postgres,
        };

        Self {
            environment: non_empty("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parsed("PORT", defaults.port),
            host: non_empty("HOST").unwrap_or(defaults.host),
            jwt_secret: non_empty("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration: parsed("JWT_EXPIRATION", defaults.jwt_expiration),
            bcrypt_cost: parsed("BCRYPT_COST", defaults.bcrypt_cost),
            cors_origins: non_empty("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit_requests: parsed("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests),
            rate_limit_window: parsed("RATE_LIMIT_WINDOW", defaults.rate_limit_window),
            store_backend,
            database_url: non_empty("DATABASE_URL"),
            redis_url: non_empty("REDIS_URL"),
            storage_url: non_empty("STORAGE_URL"),
            storage_api_key: non_empty("STORAGE_API_KEY"),
            dispatch_phone: non_empty("DISPATCH_PHONE"),
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// El backing store está disponible (memoria siempre lo está)
    pub fn is_store_configured(&self) -> bool {
        match self.store_backend {
            StoreBackend::Memory => true,
            StoreBackend::Postgres => self.database_url.is_some(),
        }
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!("PostgreSQL".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_not_configured_without_database_url() {
        let config = EnvironmentConfig::default();
        assert!(!config.is_store_configured());

        let memory = EnvironmentConfig {
            store_backend: StoreBackend::Memory,
            ..EnvironmentConfig::default()
        };
        assert!(memory.is_store_configured());
    }
}
