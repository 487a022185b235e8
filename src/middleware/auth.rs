//! Autenticación JWT
//!
//! `AuthUser` se extrae del header `Authorization: Bearer ...`. El token
//! solo identifica la sesión; el rol vigente sale del registro de sesiones,
//! así un cambio de rol o un logout tienen efecto inmediato.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::models::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Token del header Authorization, sin el prefijo `Bearer `
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Ya resuelto por el guard de rol
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let state = AppState::from_ref(state);
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

        let claims = state.jwt.validate_token(token)?;
        let session_id = Uuid::parse_str(&claims.sid)
            .map_err(|_| AppError::Unauthorized("Invalid session id".to_string()))?;

        let session = state
            .sessions
            .touch(session_id)
            .await
            .ok_or_else(|| AppError::Unauthorized("Session has ended".to_string()))?;

        let user = AuthUser {
            user_id: session.user_id,
            session_id,
            email: session.email,
            role: session.role,
            company_id: session.company_id,
        };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
