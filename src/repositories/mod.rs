//! Repositorios
//!
//! Cada colección (`orders`, `clients`, `delivery_drivers`, `profiles`) se
//! accede detrás de un trait para que los componentes puedan trabajar tanto
//! con PostgreSQL como con el almacén en memoria de las pruebas.

pub mod client_repository;
pub mod driver_repository;
pub mod memory;
pub mod order_repository;
pub mod profile_repository;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Client, DeliveryDriver, NewClient, NewDriver, NewOrder, NewProfile, Order, OrderStatus,
    Profile, UserRole,
};
use crate::utils::errors::AppResult;

pub use client_repository::ClientRepository;
pub use driver_repository::DriverRepository;
pub use memory::MemoryStore;
pub use order_repository::OrderRepository;
pub use profile_repository::ProfileRepository;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &NewOrder) -> AppResult<Order>;

    /// Pedidos creados en `[start, end]`, más recientes primero
    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Order>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<()>;

    /// `None` deja el pedido sin domiciliario
    async fn set_driver(&self, id: Uuid, driver_id: Option<Uuid>) -> AppResult<()>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Coincidencia parcial sin distinguir mayúsculas en nombre, teléfono o documento
    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Client>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Client>>;

    async fn insert(&self, client: &NewClient) -> AppResult<Client>;
}

#[async_trait]
pub trait DriverStore: Send + Sync {
    /// Activos primero, luego los más recientes
    async fn list_all(&self) -> AppResult<Vec<DeliveryDriver>>;

    /// Solo activos, ordenados por nombre
    async fn list_active(&self) -> AppResult<Vec<DeliveryDriver>>;

    async fn insert(&self, driver: &NewDriver) -> AppResult<DeliveryDriver>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<()>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>>;

    /// Más recientemente actualizados primero
    async fn list_all(&self) -> AppResult<Vec<Profile>>;

    async fn insert(&self, profile: &NewProfile) -> AppResult<Profile>;

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<()>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<()>;
}

/// Conjunto de almacenes compartido por los controladores
#[derive(Clone)]
pub struct Stores {
    pub orders: Arc<dyn OrderStore>,
    pub clients: Arc<dyn ClientStore>,
    pub drivers: Arc<dyn DriverStore>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            orders: Arc::new(OrderRepository::new(pool.clone())),
            clients: Arc::new(ClientRepository::new(pool.clone())),
            drivers: Arc::new(DriverRepository::new(pool.clone())),
            profiles: Arc::new(ProfileRepository::new(pool)),
        }
    }

    /// Todos los almacenes respaldados por la misma instancia en memoria
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            orders: store.clone(),
            clients: store.clone(),
            drivers: store.clone(),
            profiles: store,
        }
    }
}

/// Patrón ILIKE `%term%` con los comodines del término escapados
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ANA"), "%ANA%");
        assert_eq!(like_pattern("50%_"), "%50\\%\\_%");
    }
}
