//! Planilla de domiciliarios
//!
//! Lista completa (activos primero), alta y activación/desactivación con
//! cambio optimista que se revierte si el backend falla.

use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::driver_dto::CreateDriverRequest;
use crate::models::{DeliveryDriver, NewDriver};
use crate::repositories::DriverStore;
use crate::utils::errors::{not_found_error, validation_error, AppResult};

#[derive(Debug, Clone, Default)]
pub struct DriverRoster {
    drivers: Vec<DeliveryDriver>,
}

impl DriverRoster {
    pub async fn load(store: &dyn DriverStore) -> AppResult<Self> {
        Ok(Self {
            drivers: store.list_all().await?,
        })
    }

    pub fn drivers(&self) -> &[DeliveryDriver] {
        &self.drivers
    }

    pub fn into_drivers(self) -> Vec<DeliveryDriver> {
        self.drivers
    }

    /// Nombre obligatorio; nombre y placa en mayúsculas. El nuevo queda primero.
    pub async fn create(
        &mut self,
        store: &dyn DriverStore,
        request: CreateDriverRequest,
    ) -> AppResult<DeliveryDriver> {
        let full_name = request.full_name.trim().to_uppercase();
        if full_name.is_empty() {
            return Err(validation_error(
                "full_name",
                "El nombre del domiciliario es obligatorio.",
            ));
        }

        let new_driver = NewDriver {
            full_name,
            phone: request
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            vehicle_plate: request
                .vehicle_plate
                .map(|p| p.trim().to_uppercase())
                .filter(|p| !p.is_empty()),
        };

        let driver = store.insert(&new_driver).await?;
        info!("🛵 Domiciliario creado: {}", driver.full_name);
        self.drivers.insert(0, driver.clone());
        Ok(driver)
    }

    /// Invierte `is_active`; ante error vuelve al valor anterior y reporta el error
    pub async fn toggle_active(&mut self, store: &dyn DriverStore, id: Uuid) -> AppResult<DeliveryDriver> {
        let driver = self
            .drivers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;

        let previous = driver.is_active;
        driver.is_active = !previous;

        if let Err(e) = store.set_active(id, !previous).await {
            warn!("⚠️ Cambio de estado revertido para domiciliario {}: {}", id, e);
            if let Some(driver) = self.drivers.iter_mut().find(|d| d.id == id) {
                driver.is_active = previous;
            }
            return Err(e);
        }

        let driver = self
            .drivers
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;
        info!(
            "🛵 Domiciliario {} {}",
            driver.full_name,
            if driver.is_active { "activado" } else { "desactivado" }
        );
        Ok(driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;

    fn request(name: &str, plate: Option<&str>) -> CreateDriverRequest {
        CreateDriverRequest {
            full_name: name.to_string(),
            phone: Some("3000000000".to_string()),
            vehicle_plate: plate.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_uppercases_and_prepends() {
        let store = MemoryStore::new();
        let mut roster = DriverRoster::load(&store).await.unwrap();
        roster.create(&store, request("juan", Some("abc123"))).await.unwrap();
        let pedro = roster.create(&store, request("pedro", None)).await.unwrap();

        assert_eq!(pedro.full_name, "PEDRO");
        assert!(pedro.is_active);
        assert_eq!(roster.drivers()[0].id, pedro.id);
        assert_eq!(roster.drivers()[1].vehicle_plate.as_deref(), Some("ABC123"));
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let store = MemoryStore::new();
        let mut roster = DriverRoster::default();
        assert!(roster.create(&store, request("  ", None)).await.is_err());
        assert!(roster.drivers().is_empty());
    }

    #[tokio::test]
    async fn toggle_flips_and_persists() {
        let store = MemoryStore::new();
        let mut roster = DriverRoster::default();
        let juan = roster.create(&store, request("juan", None)).await.unwrap();

        let toggled = roster.toggle_active(&store, juan.id).await.unwrap();
        assert!(!toggled.is_active);
        assert!(store.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_toggle_rolls_back() {
        let store = MemoryStore::new();
        let mut roster = DriverRoster::default();
        let juan = roster.create(&store, request("juan", None)).await.unwrap();

        store.fail_writes(true);
        assert!(roster.toggle_active(&store, juan.id).await.is_err());
        assert!(roster.drivers()[0].is_active);
    }

    #[tokio::test]
    async fn load_lists_active_first() {
        let store = MemoryStore::new();
        let mut roster = DriverRoster::default();
        let juan = roster.create(&store, request("juan", None)).await.unwrap();
        roster.create(&store, request("pedro", None)).await.unwrap();
        roster.toggle_active(&store, juan.id).await.unwrap();

        let reloaded = DriverRoster::load(&store).await.unwrap();
        assert_eq!(reloaded.drivers()[0].full_name, "PEDRO");
        assert!(!reloaded.drivers()[1].is_active);
    }
}
