//! Modelo de Client
//!
//! Cliente reutilizable entre pedidos. Mapea a la tabla `clients`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Client {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub phone: Option<String>,
    pub document_id: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub total_orders: i32,
    pub last_order_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Cliente listo para insertar
#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub document_id: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl NewClient {
    /// Nombre completo en mayúsculas a partir de nombre y apellido
    pub fn compose_full_name(first_name: &str, last_name: &str) -> String {
        format!("{} {}", first_name.trim(), last_name.trim())
            .trim()
            .to_uppercase()
    }
}
