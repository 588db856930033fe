use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::controllers::auth_controller::AuthController;
use crate::dto::admin_dto::UserRow;
use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Login público; se monta en la raíz porque `/api/auth` ya lo anida el router con sesión
pub fn create_login_router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

/// Rutas que requieren sesión
pub fn create_session_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    request.validate()?;
    let controller = AuthController::new(state);
    Ok(Json(ApiResponse::success(controller.login(request).await?)))
}

async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<()>> {
    let controller = AuthController::new(state);
    controller.logout(user).await;
    Json(ApiResponse::message("Sesión cerrada"))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserRow>>, AppError> {
    let controller = AuthController::new(state);
    Ok(Json(ApiResponse::success(controller.me(user).await?)))
}
