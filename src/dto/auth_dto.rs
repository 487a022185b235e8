use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::auth::Role;
use crate::models::profile::Profile;
use crate::services::auth_service::{AuthSession, Registration};
use crate::utils::validation::validate_phone;

// Request de alta de cuenta
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    pub role: Role,
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[validate(custom = "validate_phone")]
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            full_name: request.full_name.trim().to_string(),
            role: request.role,
            company_name: request.company_name,
            company_phone: request.company_phone,
            company_address: request.company_address,
        }
    }
}

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: i64,
    pub user: Profile,
    /// A dónde debe ir el cliente tras iniciar sesión
    pub home: &'static str,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            token_type: "Bearer",
            expires_at: session.expires_at,
            home: session.profile.role.home_location(),
            user: session.profile,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}
