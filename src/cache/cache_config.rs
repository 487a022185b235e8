//! Configuración de cache
//!
//! Este módulo contiene la configuración para el sistema de cache.

use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::business::JOB_BOARD_REFRESH_SECS;

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: String,
    pub default_ttl: u64,
}

impl CacheConfig {
    pub fn new(redis_url: String) -> Self {
        Self {
            redis_url,
            default_ttl: JOB_BOARD_REFRESH_SECS,
        }
    }
}

/// Operaciones de cache
#[async_trait::async_trait]
pub trait CacheOperations {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>;
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: u64) -> Result<()>;
}
