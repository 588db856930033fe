use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::CreateDriverRequest;
use crate::dto::ApiResponse;
use crate::models::DeliveryDriver;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/active", get(list_active_drivers))
        .route("/:id/toggle", post(toggle_driver))
}

async fn list_drivers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DeliveryDriver>>>, AppError> {
    let controller = DriverController::new(state.stores.clone());
    Ok(Json(ApiResponse::success(controller.list().await?)))
}

async fn list_active_drivers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DeliveryDriver>>>, AppError> {
    let controller = DriverController::new(state.stores.clone());
    Ok(Json(ApiResponse::success(controller.list_active().await?)))
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<DeliveryDriver>>, AppError> {
    request.validate()?;
    let controller = DriverController::new(state.stores.clone());
    let driver = controller.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(driver, "Domiciliario creado")))
}

async fn toggle_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeliveryDriver>>, AppError> {
    let controller = DriverController::new(state.stores.clone());
    Ok(Json(ApiResponse::success(controller.toggle(id).await?)))
}
