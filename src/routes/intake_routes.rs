use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::intake_controller::IntakeController;
use crate::dto::intake_dto::{
    FocusRequest, FocusResponse, IntakeSnapshot, ListeningRequest, MagicPasteRequest,
    UpdateIntakeRequest,
};
use crate::dto::order_dto::OrderView;
use crate::dto::ApiResponse;
use crate::services::magic_paste::ParsedInvoiceData;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_intake_router() -> Router<AppState> {
    Router::new()
        .route("/", post(open_intake))
        .route("/magic-paste", post(magic_paste))
        .route("/:id", get(get_intake).patch(update_intake))
        .route("/:id/focus", post(focus_intake))
        .route("/:id/listening", post(set_listening))
        .route("/:id/reset", post(reset_intake))
        .route("/:id/save", post(save_intake))
}

async fn open_intake(State(state): State<AppState>) -> Json<ApiResponse<IntakeSnapshot>> {
    let controller = IntakeController::new(state);
    Json(ApiResponse::success(controller.open().await))
}

async fn get_intake(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IntakeSnapshot>>, AppError> {
    let controller = IntakeController::new(state);
    Ok(Json(ApiResponse::success(controller.get(id).await?)))
}

async fn focus_intake(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FocusRequest>,
) -> Result<Json<ApiResponse<FocusResponse>>, AppError> {
    let controller = IntakeController::new(state);
    Ok(Json(ApiResponse::success(controller.focus(id, request).await?)))
}

async fn update_intake(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateIntakeRequest>,
) -> Result<Json<ApiResponse<IntakeSnapshot>>, AppError> {
    let controller = IntakeController::new(state);
    Ok(Json(ApiResponse::success(controller.update(id, request).await?)))
}

async fn set_listening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ListeningRequest>,
) -> Result<Json<ApiResponse<IntakeSnapshot>>, AppError> {
    let controller = IntakeController::new(state);
    let snapshot = controller.set_listening(id, request.listening).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

async fn reset_intake(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<IntakeSnapshot>>, AppError> {
    let controller = IntakeController::new(state);
    Ok(Json(ApiResponse::success(controller.reset(id).await?)))
}

async fn save_intake(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderView>>, AppError> {
    let controller = IntakeController::new(state);
    let order = controller.save(id).await?;
    Ok(Json(ApiResponse::success_with_message(order, "Pedido guardado")))
}

async fn magic_paste(
    State(state): State<AppState>,
    Json(request): Json<MagicPasteRequest>,
) -> Result<Json<ApiResponse<ParsedInvoiceData>>, AppError> {
    request.validate()?;
    let controller = IntakeController::new(state);
    Ok(Json(ApiResponse::success(controller.magic_paste(&request.text)?)))
}
