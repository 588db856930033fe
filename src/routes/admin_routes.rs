use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::admin_controller::AdminController;
use crate::dto::admin_dto::UserRow;
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::services::admin_panel::AdminAccess;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas del panel de roles. Se montan detrás de `optional_auth_middleware`:
/// sin operador o sin rol admin se responde con una redirección.
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/toggle-role", post(toggle_role))
        .route("/users/:id/toggle-active", post(toggle_active))
}

async fn gate(
    controller: &AdminController,
    user: Option<Extension<AuthenticatedUser>>,
) -> Result<Option<Response>, AppError> {
    let caller = user.map(|Extension(user)| user.profile_id);
    let access = controller.authorize(caller).await?;
    Ok(match access {
        AdminAccess::Granted(_) => None,
        denied => denied
            .redirect_path()
            .map(|path| Redirect::temporary(path).into_response()),
    })
}

async fn list_users(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
) -> Result<Response, AppError> {
    let controller = AdminController::new(state.stores.clone(), state.sessions.clone());
    if let Some(redirect) = gate(&controller, user).await? {
        return Ok(redirect);
    }
    let rows: Vec<UserRow> = controller.list().await?;
    Ok(Json(ApiResponse::success(rows)).into_response())
}

async fn toggle_role(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let controller = AdminController::new(state.stores.clone(), state.sessions.clone());
    if let Some(redirect) = gate(&controller, user).await? {
        return Ok(redirect);
    }
    let rows = controller.toggle_role(id).await?;
    Ok(Json(ApiResponse::success(rows)).into_response())
}

async fn toggle_active(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let controller = AdminController::new(state.stores.clone(), state.sessions.clone());
    if let Some(redirect) = gate(&controller, user).await? {
        return Ok(redirect);
    }
    let rows = controller.toggle_active(id).await?;
    Ok(Json(ApiResponse::success(rows)).into_response())
}
