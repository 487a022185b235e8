//! Registro de sesiones activas
//!
//! Contexto explícito construido una vez al arrancar y compartido vía
//! `AppState`. Cada cambio (inicio de sesión, cambio de rol, cierre) se
//! publica en un canal broadcast al que cualquiera puede suscribirse.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::models::auth::{Role, SessionInfo};
use crate::models::profile::Profile;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn { session_id: Uuid, user_id: Uuid, role: Role },
    RoleChanged { user_id: Uuid, role: Role },
    SignedOut { session_id: Uuid, user_id: Uuid },
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionInfo>>>,
    events: broadcast::Sender<SessionEvent>,
    ttl: Duration,
}

impl SessionRegistry {
    /// `ttl` es la vida de la sesión, la misma que la del token
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            events,
            ttl,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: SessionEvent) {
        // Sin suscriptores el envío falla; no es un error
        let _ = self.events.send(event);
    }

    /// Abre una sesión nueva para el perfil
    pub async fn open(&self, profile: &Profile) -> SessionInfo {
        let now = Utc::now();
        let session = SessionInfo {
            session_id: Uuid::new_v4(),
            user_id: profile.id,
            email: profile.email.clone(),
            role: profile.role,
            company_id: profile.company_id,
            created_at: now,
            last_activity: now,
            expires_at: now + self.ttl,
        };

        {
            let mut sessions = self.sessions.write().await;
            // Limpiar sesiones caducadas
            sessions.retain(|_, s| !s.is_expired(now));
            sessions.insert(session.session_id, session.clone());
        }
        log::info!("🔑 Sesión abierta para {} ({})", session.email, session.role);

        self.notify(SessionEvent::SignedIn {
            session_id: session.session_id,
            user_id: session.user_id,
            role: session.role,
        });
        session
    }

    /// Sesión activa, actualizando su última actividad. Una sesión caducada
    /// se descarta igual que si se hubiera cerrado.
    pub async fn touch(&self, session_id: Uuid) -> Option<SessionInfo> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.get_mut(&session_id).map(|session| {
            session.last_activity = now;
            session.clone()
        })
    }

    /// Propaga un cambio de rol a todas las sesiones del usuario
    pub async fn set_role(&self, user_id: Uuid, role: Role) -> usize {
        let mut updated = 0;
        {
            let mut sessions = self.sessions.write().await;
            for session in sessions.values_mut().filter(|s| s.user_id == user_id) {
                session.role = role;
                updated += 1;
            }
        }

        log::info!("🔄 Rol de {} cambiado a {} ({} sesiones)", user_id, role, updated);
        self.notify(SessionEvent::RoleChanged { user_id, role });
        updated
    }

    /// Cierra la sesión; devuelve la sesión eliminada
    pub async fn close(&self, session_id: Uuid) -> Option<SessionInfo> {
        let removed = self.sessions.write().await.remove(&session_id);
        if let Some(session) = &removed {
            log::info!("👋 Sesión cerrada para {}", session.email);
            self.notify(SessionEvent::SignedOut {
                session_id,
                user_id: session.user_id,
            });
        }
        removed
    }

    pub async fn active_count(&self) -> usize {
        let now = Utc::now();
        self.sessions.read().await.values().filter(|s| !s.is_expired(now)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Role) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "ops@haulage.co.uk".to_string(),
            password_hash: String::new(),
            full_name: "Ops".to_string(),
            role,
            company_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Duration::hours(1))
    }

    #[tokio::test]
    async fn test_open_and_close_publishes_events() {
        let registry = registry();
        let mut events = registry.subscribe();
        let user = profile(Role::Company);

        let session = registry.open(&user).await;
        assert_eq!(registry.active_count().await, 1);
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedIn { role: Role::Company, .. }));

        registry.close(session.session_id).await.unwrap();
        assert!(registry.touch(session.session_id).await.is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedOut { session_id: session.session_id, user_id: user.id }
        );
    }

    #[tokio::test]
    async fn test_role_change_reaches_every_session() {
        let registry = registry();
        let user = profile(Role::Driver);
        let first = registry.open(&user).await;
        let second = registry.open(&user).await;

        assert_eq!(registry.set_role(user.id, Role::Broker).await, 2);
        assert_eq!(registry.touch(first.session_id).await.unwrap().role, Role::Broker);
        assert_eq!(registry.touch(second.session_id).await.unwrap().role, Role::Broker);
    }

    #[tokio::test]
    async fn test_close_unknown_session_is_noop() {
        let registry = registry();
        assert!(registry.close(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_reclaimed() {
        let registry = SessionRegistry::new(Duration::zero());
        let user = profile(Role::Broker);

        let mut last = None;
        for _ in 0..1_000 {
            last = Some(registry.open(&user).await);
        }
        // Cada apertura descarta las anteriores ya caducadas
        assert!(registry.sessions.read().await.len() <= 1);
        assert_eq!(registry.active_count().await, 0);

        let last = last.unwrap();
        assert!(registry.touch(last.session_id).await.is_none());
        assert!(registry.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_session_expiry_matches_ttl() {
        let registry = registry();
        let session = registry.open(&profile(Role::Company)).await;
        assert_eq!(session.expires_at - session.created_at, Duration::hours(1));
        assert!(registry.touch(session.session_id).await.is_some());
    }
}
