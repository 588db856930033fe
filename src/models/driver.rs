//! Modelo de DeliveryDriver
//!
//! Domiciliario asignable a pedidos con entrega a domicilio.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DeliveryDriver {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub vehicle_plate: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDriver {
    pub full_name: String,
    pub phone: Option<String>,
    pub vehicle_plate: Option<String>,
}
