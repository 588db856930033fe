use crate::dto::admin_dto::UserRow;
use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::middleware::AuthenticatedUser;
use crate::services::auth_service;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AuthController {
    state: AppState,
}

impl AuthController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let outcome = auth_service::login(
            self.state.stores.profiles.as_ref(),
            &self.state.sessions,
            &self.state.jwt,
            &request.email,
            &request.password,
        )
        .await?;
        Ok(LoginResponse::from(outcome))
    }

    pub async fn logout(&self, user: AuthenticatedUser) {
        auth_service::logout(&self.state.sessions, user.session_id).await;
    }

    pub async fn me(&self, user: AuthenticatedUser) -> AppResult<UserRow> {
        let profile = auth_service::me(self.state.stores.profiles.as_ref(), user.profile_id).await?;
        Ok(UserRow::from(profile))
    }
}
