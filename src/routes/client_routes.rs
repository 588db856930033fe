use axum::{
    extract::{Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::controllers::client_controller::ClientController;
use crate::dto::client_dto::{ClientQuery, CreateClientRequest, PublicRegistrationRequest};
use crate::dto::ApiResponse;
use crate::middleware::rate_limit_middleware;
use crate::models::Client;
use crate::services::client_directory::{ClientPrefill, RegistrationOutcome};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_client_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_client))
        .route("/search", get(search_clients))
        .route("/prefill", get(prefill_client))
}

/// Registro público de clientes, sin sesión y con rate limit
pub fn create_registration_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(register_client))
        .route_layer(middleware::from_fn_with_state(state, rate_limit_middleware))
}

async fn search_clients(
    State(state): State<AppState>,
    Query(query): Query<ClientQuery>,
) -> Result<Json<ApiResponse<Vec<Client>>>, AppError> {
    let controller = ClientController::new(state.stores.clone());
    Ok(Json(ApiResponse::success(controller.search(&query.q).await?)))
}

async fn prefill_client(
    State(state): State<AppState>,
    Query(query): Query<ClientQuery>,
) -> Json<ApiResponse<ClientPrefill>> {
    let controller = ClientController::new(state.stores.clone());
    Json(ApiResponse::success(controller.prefill(&query.q)))
}

async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    request.validate()?;
    let controller = ClientController::new(state.stores.clone());
    let client = controller.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(client, "Cliente creado")))
}

async fn register_client(
    State(state): State<AppState>,
    Json(request): Json<PublicRegistrationRequest>,
) -> Json<RegistrationOutcome> {
    let controller = ClientController::new(state.stores.clone());
    Json(controller.register_public(request).await)
}
