//! Modelo de Profile
//!
//! Cuenta de usuario. El rol vive aquí y en `user_roles`; es la única
//! señal de autorización que consumen los guards de ruta.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::auth::Role;

/// Profile principal - mapea a la tabla profiles
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
