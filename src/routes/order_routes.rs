use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post, put},
    Json, Router,
};
use futures::stream::Stream;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::intake_controller::IntakeController;
use crate::controllers::order_controller::{self, OrderController};
use crate::dto::order_dto::{
    AssignDriverRequest, BoardQuery, BoardSnapshot, CreateOrderRequest, OrderView,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_order_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_board).post(create_order))
        .route("/live", get(live_board))
        .route("/:id/advance", post(advance_order))
        .route("/:id/driver", put(assign_driver))
}

async fn get_board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<ApiResponse<BoardSnapshot>>, AppError> {
    let date = query.resolve_date()?;
    let controller = OrderController::new(state.stores.clone());
    Ok(Json(ApiResponse::success(controller.board(date).await?)))
}

async fn live_board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let date = query.resolve_date()?;
    let stream = order_controller::live_board(&state, date).await?;
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<OrderView>>, AppError> {
    request.validate()?;
    let controller = IntakeController::new(state);
    let order = controller.create_order(request).await?;
    Ok(Json(ApiResponse::success_with_message(order, "Pedido guardado")))
}

async fn advance_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderView>>, AppError> {
    let controller = OrderController::new(state.stores.clone());
    Ok(Json(ApiResponse::success(controller.advance(id).await?)))
}

async fn assign_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignDriverRequest>,
) -> Result<Json<ApiResponse<OrderView>>, AppError> {
    let controller = OrderController::new(state.stores.clone());
    let order = controller.assign_driver(id, request.driver_id).await?;
    Ok(Json(ApiResponse::success(order)))
}
