use uuid::Uuid;

use crate::dto::driver_dto::CreateDriverRequest;
use crate::models::DeliveryDriver;
use crate::repositories::Stores;
use crate::services::driver_roster::DriverRoster;
use crate::utils::errors::AppResult;

pub struct DriverController {
    stores: Stores,
}

impl DriverController {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn list(&self) -> AppResult<Vec<DeliveryDriver>> {
        Ok(DriverRoster::load(self.stores.drivers.as_ref()).await?.into_drivers())
    }

    pub async fn list_active(&self) -> AppResult<Vec<DeliveryDriver>> {
        self.stores.drivers.list_active().await
    }

    pub async fn create(&self, request: CreateDriverRequest) -> AppResult<DeliveryDriver> {
        let mut roster = DriverRoster::default();
        roster.create(self.stores.drivers.as_ref(), request).await
    }

    pub async fn toggle(&self, id: Uuid) -> AppResult<DeliveryDriver> {
        let drivers = self.stores.drivers.as_ref();
        let mut roster = DriverRoster::load(drivers).await?;
        roster.toggle_active(drivers, id).await
    }
}
