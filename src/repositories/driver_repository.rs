use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::DriverStore;
use crate::models::{DeliveryDriver, NewDriver};
use crate::utils::errors::{not_found_error, AppResult};

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverStore for DriverRepository {
    async fn list_all(&self) -> AppResult<Vec<DeliveryDriver>> {
        let drivers = sqlx::query_as::<_, DeliveryDriver>(
            "SELECT * FROM delivery_drivers ORDER BY is_active DESC, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn list_active(&self) -> AppResult<Vec<DeliveryDriver>> {
        let drivers = sqlx::query_as::<_, DeliveryDriver>(
            "SELECT * FROM delivery_drivers WHERE is_active = TRUE ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn insert(&self, driver: &NewDriver) -> AppResult<DeliveryDriver> {
        let created = sqlx::query_as::<_, DeliveryDriver>(
            r#"
            INSERT INTO delivery_drivers (full_name, phone, vehicle_plate, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING *
            "#,
        )
        .bind(&driver.full_name)
        .bind(&driver.phone)
        .bind(&driver.vehicle_plate)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE delivery_drivers SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Driver", &id.to_string()));
        }
        Ok(())
    }
}
