//! Modelo de Order
//!
//! Un pedido de cliente con sus facturas, su estado de despacho y el
//! domiciliario asignado. Mapea a la tabla `orders`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use uuid::Uuid;

/// Estado del pedido - mapea al ENUM order_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "order_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Tomado,
    Despacho,
    Entregado,
    /// Declarado en el esquema, sin transición que llegue a él
    Pagado,
}

impl OrderStatus {
    /// Única transición hacia adelante permitida desde el tablero
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Tomado => Some(OrderStatus::Despacho),
            OrderStatus::Despacho => Some(OrderStatus::Entregado),
            OrderStatus::Entregado | OrderStatus::Pagado => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Tomado => "TOMADO",
            OrderStatus::Despacho => "DESPACHO",
            OrderStatus::Entregado => "ENTREGADO",
            OrderStatus::Pagado => "PAGADO",
        }
    }
}

/// Tipo de entrega - mapea al ENUM delivery_type
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "delivery_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryType {
    #[default]
    Domicilio,
    Tienda,
}

/// Par (código, valor) de una factura física
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceLine {
    pub code: String,
    pub value: String,
}

/// Pedido tal como se lee de la base, con el nombre del domiciliario unido
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub public_id: String,
    pub client_name: String,
    pub total_value: Decimal,
    pub observations: Option<String>,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub invoices_data: Json<Vec<InvoiceLine>>,
    pub created_at: DateTime<Utc>,
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub driver_name: Option<String>,
}

impl Order {
    /// El selector de domiciliario solo aplica a domicilios aún no entregados
    pub fn accepts_driver(&self) -> bool {
        self.delivery_type == DeliveryType::Domicilio && self.status != OrderStatus::Entregado
    }
}

/// Pedido listo para insertar; el estado siempre arranca en TOMADO
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub public_id: String,
    pub client_name: String,
    pub total_value: Decimal,
    pub observations: String,
    pub status: OrderStatus,
    pub delivery_type: DeliveryType,
    pub invoices: Vec<InvoiceLine>,
}

/// Tipo de operación reportada por el feed de cambios
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Notificación de cambio sobre la tabla `orders`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(rename = "record")]
    pub order: Option<Order>,
}
