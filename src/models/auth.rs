use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Roles del sistema (llevados en los metadatos del usuario)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Owner,
    Mobile,
    Broker,
    Driver,
    Company,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Owner,
        Role::Mobile,
        Role::Broker,
        Role::Driver,
        Role::Company,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Owner => "owner",
            Role::Mobile => "mobile",
            Role::Broker => "broker",
            Role::Driver => "driver",
            Role::Company => "company",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "owner" => Some(Role::Owner),
            "mobile" => Some(Role::Mobile),
            "broker" => Some(Role::Broker),
            "driver" => Some(Role::Driver),
            "company" => Some(Role::Company),
            _ => None,
        }
    }

    /// Roles ligados a una empresa concreta
    pub fn is_company_scoped(&self) -> bool {
        matches!(self, Role::Broker | Role::Driver | Role::Company)
    }

    /// Ubicación por defecto a la que se redirige un acceso denegado
    pub fn home_location(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Owner => "/owner",
            Role::Mobile | Role::Driver => "/mobile",
            Role::Broker | Role::Company => "/portal",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims del JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // profile id
    pub sid: String, // session id
    pub email: String,
    pub role: String,
    pub company_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Usuario autenticado que se inyecta en los handlers
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub email: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Información de una sesión activa
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Coincide con el `exp` del token emitido para la sesión
    pub expires_at: DateTime<Utc>,
}

impl SessionInfo {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("SuperAdmin"), None);
    }

    #[test]
    fn test_home_locations() {
        assert_eq!(Role::Driver.home_location(), "/mobile");
        assert_eq!(Role::Broker.home_location(), "/portal");
        assert!(Role::Company.is_company_scoped());
        assert!(!Role::Owner.is_company_scoped());
    }
}
