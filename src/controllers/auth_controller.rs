use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, ChangeRoleRequest, LoginRequest, RegisterRequest};
use crate::dto::ApiResponse;
use crate::models::auth::AuthUser;
use crate::models::profile::Profile;
use crate::services::auth_service::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AuthController {
    service: AuthService,
}

impl AuthController {
    pub fn new(state: &AppState) -> AppResult<Self> {
        Ok(Self {
            service: AuthService::new(
                state.repos()?,
                state.sessions.clone(),
                state.jwt.clone(),
                state.config.bcrypt_cost,
            ),
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<ApiResponse<AuthResponse>> {
        request.validate()?;
        let session = self.service.register(request.into()).await?;
        Ok(ApiResponse::success_with_message(session.into(), "Account created"))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<ApiResponse<AuthResponse>> {
        request.validate()?;
        let session = self.service.login(&request.email, &request.password).await?;
        Ok(ApiResponse::success(session.into()))
    }

    pub async fn logout(&self, user: &AuthUser) -> ApiResponse<()> {
        self.service.logout(user).await;
        ApiResponse::message("Signed out")
    }

    pub async fn me(&self, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
        Ok(ApiResponse::success(self.service.me(user).await?))
    }

    pub async fn change_role(&self, user_id: Uuid, request: ChangeRoleRequest) -> AppResult<ApiResponse<Profile>> {
        let profile = self.service.change_role(user_id, request.role).await?;
        Ok(ApiResponse::success_with_message(profile, "Role updated"))
    }
}
