use bcrypt::{hash, verify};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::auth::{AuthUser, Role, SessionInfo};
use crate::models::company::Company;
use crate::models::profile::Profile;
use crate::repositories::{FleetRepository, ProfileRepository, Repositories};
use crate::services::jwt_service::JwtService;
use crate::services::session::SessionRegistry;
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError, AppResult};

/// Datos de alta de una cuenta
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
}

/// Sesión recién abierta con su token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub expires_at: i64,
    pub profile: Profile,
    pub session: SessionInfo,
}

/// Servicio de autenticación
pub struct AuthService {
    profiles: Arc<dyn ProfileRepository>,
    fleet: Arc<dyn FleetRepository>,
    sessions: SessionRegistry,
    jwt: JwtService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(repos: &Repositories, sessions: SessionRegistry, jwt: JwtService, bcrypt_cost: u32) -> Self {
        Self {
            profiles: repos.profiles.clone(),
            fleet: repos.fleet.clone(),
            sessions,
            jwt,
            bcrypt_cost,
        }
    }

    /// Alta de cuenta; los roles de empresa crean también su empresa
    pub async fn register(&self, registration: Registration) -> AppResult<AuthSession> {
        if matches!(registration.role, Role::Admin | Role::Owner) {
            return Err(forbidden_error(
                "register",
                "this role is assigned by an administrator",
            ));
        }

        // Evita crear la empresa si el email ya existe; el índice único sigue siendo la garantía
        if self.profiles.find_by_email(registration.email.trim()).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let company_id = if registration.role.is_company_scoped() {
            let name = registration
                .company_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| validation_error("company_name", "Company name is required for this role"))?;

            let company = Company::new(
                name.to_string(),
                Some(registration.email.clone()),
                registration.company_phone.clone(),
                registration.company_address.clone(),
            );
            let company = self.fleet.insert_company(company).await?;
            info!("🏢 Empresa creada: {} ({})", company.name, company.id);
            Some(company.id)
        } else {
            None
        };

        let password_hash = hash(&registration.password, self.bcrypt_cost)
            .map_err(|e| AppError::Hash(e.to_string()))?;

        let profile = Profile {
            id: Uuid::new_v4(),
            email: registration.email.trim().to_lowercase(),
            password_hash,
            full_name: registration.full_name,
            role: registration.role,
            company_id,
            created_at: Utc::now(),
        };
        let profile = self.profiles.insert(profile).await?;
        info!("✅ Cuenta registrada: {} ({})", profile.email, profile.role);

        self.start_session(profile).await
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let profile = self.profiles.find_by_email(email.trim()).await?.ok_or_else(invalid)?;

        let matches = verify(password, &profile.password_hash).map_err(|e| AppError::Hash(e.to_string()))?;
        if !matches {
            warn!("🔒 Contraseña incorrecta para {}", profile.email);
            return Err(invalid());
        }

        self.start_session(profile).await
    }

    async fn start_session(&self, profile: Profile) -> AppResult<AuthSession> {
        let session = self.sessions.open(&profile).await;
        let (token, expires_at) = self.jwt.generate_access_token(&session)?;

        Ok(AuthSession { token, expires_at, profile, session })
    }

    /// Cierra la sesión del token actual
    pub async fn logout(&self, user: &AuthUser) -> bool {
        self.sessions.close(user.session_id).await.is_some()
    }

    pub async fn me(&self, user: &AuthUser) -> AppResult<Profile> {
        self.profiles
            .find_by_id(user.user_id)
            .await?
            .ok_or_else(|| not_found_error("Profile", &user.user_id.to_string()))
    }

    /// Cambio de rol por un admin; las sesiones abiertas lo reciben al momento
    pub async fn change_role(&self, user_id: Uuid, role: Role) -> AppResult<Profile> {
        let profile = self
            .profiles
            .set_role(user_id, role)
            .await?
            .ok_or_else(|| not_found_error("Profile", &user_id.to_string()))?;

        self.sessions.set_role(user_id, role).await;
        Ok(profile)
    }
}
