use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{DeliveryDriver, DeliveryType, Order, OrderStatus};
use crate::services::dispatch_board::{self, BoardStats, DispatchBoard};
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::validate_date;

// Query `?date=YYYY-MM-DD`; sin fecha se usa el día actual
#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    pub date: Option<String>,
}

impl BoardQuery {
    pub fn resolve_date(&self) -> AppResult<NaiveDate> {
        match self.date.as_deref().filter(|d| !d.is_empty()) {
            None => Ok(dispatch_board::today()),
            Some(raw) => validate_date(raw)
                .map_err(|_| validation_error("date", "Fecha inválida, use el formato YYYY-MM-DD")),
        }
    }
}

// Pedido con los controles que el tablero expone
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub next_status: Option<OrderStatus>,
    pub can_assign_driver: bool,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            next_status: dispatch_board::transition_for(&order),
            can_assign_driver: dispatch_board::can_assign_driver(&order),
            order,
        }
    }
}

// Estado completo del tablero para un día
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub date: NaiveDate,
    pub orders: Vec<OrderView>,
    pub stats: BoardStats,
    pub active_drivers: Vec<DeliveryDriver>,
}

impl From<&DispatchBoard> for BoardSnapshot {
    fn from(board: &DispatchBoard) -> Self {
        Self {
            date: board.date(),
            orders: board.orders().iter().cloned().map(OrderView::from).collect(),
            stats: board.stats(),
            active_drivers: board.active_drivers().to_vec(),
        }
    }
}

// `{"driver_id": null}` deja el pedido sin domiciliario
#[derive(Debug, Deserialize)]
pub struct AssignDriverRequest {
    #[serde(default)]
    pub driver_id: Option<Uuid>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvoiceInput {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub value: String,
}

// Creación de un pedido con el formulario ya completo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(max = 2, message = "Un pedido admite como máximo dos facturas"))]
    #[serde(default)]
    pub invoices: Vec<InvoiceInput>,
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub observations: String,
}
