use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::environment::EnvironmentConfig;
use crate::models::auth::{JwtClaims, SessionInfo};
use crate::utils::errors::{AppError, AppResult};

/// Servicio JWT (HS256)
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(&config.jwt_secret)
    }

    /// Genera un token de acceso ligado a una sesión; caduca con ella
    pub fn generate_access_token(&self, session: &SessionInfo) -> AppResult<(String, i64)> {
        let now = Utc::now();
        let exp = session.expires_at.timestamp();

        let claims = JwtClaims {
            sub: session.user_id.to_string(),
            sid: session.session_id.to_string(),
            email: session.email.clone(),
            role: session.role.as_str().to_string(),
            company_id: session.company_id.map(|id| id.to_string()),
            exp,
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Jwt(format!("Error generating access token: {}", e)))?;
        Ok((token, exp))
    }

    /// Valida y decodifica un token
    pub fn validate_token(&self, token: &str) -> AppResult<JwtClaims> {
        let validation = Validation::new(self.algorithm);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use chrono::Duration;
    use uuid::Uuid;

    fn session() -> SessionInfo {
        SessionInfo {
            session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "dispatch@haulage.co.uk".to_string(),
            role: Role::Company,
            company_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            last_activity: Utc::now(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let jwt = JwtService::new("test-secret");
        let session = session();

        let (token, exp) = jwt.generate_access_token(&session).unwrap();
        let claims = jwt.validate_token(&token).unwrap();

        assert_eq!(claims.sub, session.user_id.to_string());
        assert_eq!(claims.sid, session.session_id.to_string());
        assert_eq!(claims.role, "company");
        assert_eq!(claims.exp, exp);
        assert_eq!(exp, session.expires_at.timestamp());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (token, _) = JwtService::new("a").generate_access_token(&session()).unwrap();
        let err = JwtService::new("b").validate_token(&token).unwrap_err();
        assert_eq!(err.code(), "JWT_ERROR");
    }
}
