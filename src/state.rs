//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Todo lo que contiene se construye una vez
//! al arrancar.

use chrono::Duration;
use std::sync::Arc;

use crate::cache::JobBoardCache;
use crate::clients::{MemoryPhotoStorage, PhotoStorage};
use crate::config::environment::{EnvironmentConfig, StoreBackend};
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::Repositories;
use crate::services::jwt_service::JwtService;
use crate::services::session::SessionRegistry;
use crate::utils::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    /// `None` = modo no configurado
    pub repos: Option<Repositories>,
    pub sessions: SessionRegistry,
    pub jwt: JwtService,
    pub board_cache: Option<JobBoardCache>,
    pub storage: Option<Arc<dyn PhotoStorage>>,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        repos: Option<Repositories>,
        board_cache: Option<JobBoardCache>,
        storage: Option<Arc<dyn PhotoStorage>>,
    ) -> Self {
        Self {
            jwt: JwtService::from_config(&config),
            rate_limit: RateLimitState::from_config(&config),
            sessions: SessionRegistry::new(Duration::seconds(config.jwt_expiration as i64)),
            config,
            repos,
            board_cache,
            storage,
        }
    }

    /// Estado completamente en memoria (STORE_BACKEND=memory y tests)
    pub fn in_memory(config: EnvironmentConfig, storage: MemoryPhotoStorage) -> Self {
        let config = EnvironmentConfig {
            store_backend: StoreBackend::Memory,
            ..config
        };
        Self::new(config, Some(Repositories::memory()), None, Some(Arc::new(storage)))
    }

    pub fn is_configured(&self) -> bool {
        self.repos.is_some()
    }

    pub fn repos(&self) -> AppResult<&Repositories> {
        self.repos.as_ref().ok_or(AppError::NotConfigured)
    }

    pub fn storage(&self) -> AppResult<Arc<dyn PhotoStorage>> {
        self.storage
            .clone()
            .ok_or_else(|| AppError::ServiceUnavailable("Object storage is not configured".to_string()))
    }
}
