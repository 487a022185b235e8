use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use freight_exchange::cache::{CacheConfig, JobBoardCache, RedisClient};
use freight_exchange::clients::{HttpObjectStorage, MemoryPhotoStorage, PhotoStorage};
use freight_exchange::config::database::DatabaseConfig;
use freight_exchange::config::environment::{EnvironmentConfig, StoreBackend};
use freight_exchange::database;
use freight_exchange::repositories::Repositories;
use freight_exchange::services::SessionEvent;
use freight_exchange::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG manda si existe)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚛 Freight Exchange - marketplace de cargas");
    info!("================================================");

    let config = EnvironmentConfig::from_env();

    let repos = match (&config.store_backend, &config.database_url) {
        (StoreBackend::Memory, _) => {
            info!("🧠 Backing store en memoria (los datos se pierden al reiniciar)");
            Some(Repositories::memory())
        }
        (StoreBackend::Postgres, Some(url)) => {
            let pool = database::connect(&DatabaseConfig::new(url.clone())).await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                e
            })?;
            info!("✅ PostgreSQL conectado");
            Some(Repositories::postgres(pool))
        }
        (StoreBackend::Postgres, None) => {
            warn!("⚠️ DATABASE_URL no definido: arrancando en modo no configurado");
            warn!("⚠️ Las rutas del marketplace responderán 503 hasta configurar el backing store");
            None
        }
    };

    // Redis es opcional: sin él la bolsa se sirve directamente del store
    let board_cache = match &config.redis_url {
        Some(url) => match RedisClient::new(CacheConfig::new(url.clone())).await {
            Ok(client) => {
                info!("✅ Cache de la bolsa activa");
                Some(JobBoardCache::new(client))
            }
            Err(e) => {
                warn!("⚠️ Redis no disponible ({}), continuando sin cache", e);
                None
            }
        },
        None => None,
    };

    let storage: Option<Arc<dyn PhotoStorage>> = match (&config.storage_url, &config.store_backend) {
        (Some(url), _) => {
            info!("📸 Object storage en {}", url);
            let storage: Arc<dyn PhotoStorage> =
                Arc::new(HttpObjectStorage::new(url.clone(), config.storage_api_key.clone()));
            Some(storage)
        }
        (None, StoreBackend::Memory) => {
            let storage: Arc<dyn PhotoStorage> = Arc::new(MemoryPhotoStorage::new());
            Some(storage)
        }
        (None, StoreBackend::Postgres) => {
            warn!("⚠️ STORAGE_URL no definido: la confirmación de entregas no estará disponible");
            None
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let state = AppState::new(config, repos, board_cache, storage);

    spawn_session_logger(&state);

    let app = create_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health, /api/config, /api/board");
    info!("🔐 /api/auth: register, login, logout, me");
    info!("📦 /api/jobs: listado, publicación, export CSV, pujas, recogida, entrega, retrasos");
    info!("💷 /api/bids: mis pujas, aceptar, rechazar, retirar");
    info!("🧾 /api/invoices: preview, alta, edición, impresión");
    info!("📊 /api/owner/analytics");
    info!("🛠️ /api/admin y /api/portal: empresas, conductores, vehículos, documentos");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!("❌ Error del servidor: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Traza los cambios de sesión publicados por el registro
fn spawn_session_logger(state: &AppState) {
    let mut events = state.sessions.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SignedIn { user_id, role, .. }) => {
                    debug!(%user_id, %role, "📣 Evento de sesión: inicio");
                }
                Ok(SessionEvent::RoleChanged { user_id, role }) => {
                    debug!(%user_id, %role, "📣 Evento de sesión: cambio de rol");
                }
                Ok(SessionEvent::SignedOut { user_id, .. }) => {
                    debug!(%user_id, "📣 Evento de sesión: cierre");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("⚠️ Logger de sesiones retrasado, {} eventos omitidos", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
