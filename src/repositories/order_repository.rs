use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::OrderStore;
use crate::models::{NewOrder, Order, OrderStatus};
use crate::utils::errors::{not_found_error, AppResult};

const ORDER_COLUMNS: &str = r#"
    o.id, o.public_id, o.client_name, o.total_value, o.observations, o.status,
    o.delivery_type, o.invoices_data, o.created_at, o.driver_id,
    d.full_name AS driver_name
"#;

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn insert(&self, order: &NewOrder) -> AppResult<Order> {
        let created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (public_id, client_name, total_value, observations, status, delivery_type, invoices_data)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, public_id, client_name, total_value, observations, status,
                      delivery_type, invoices_data, created_at, driver_id, NULL::text AS driver_name
            "#,
        )
        .bind(&order.public_id)
        .bind(&order.client_name)
        .bind(order.total_value)
        .bind(&order.observations)
        .bind(order.status)
        .bind(order.delivery_type)
        .bind(Json(&order.invoices))
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Order>> {
        let query = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            LEFT JOIN delivery_drivers d ON d.id = o.driver_id
            WHERE o.created_at >= $1 AND o.created_at <= $2
            ORDER BY o.created_at DESC
            "#
        );

        let orders = sqlx::query_as::<_, Order>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let query = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            LEFT JOIN delivery_drivers d ON d.id = o.driver_id
            WHERE o.id = $1
            "#
        );

        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Order", &id.to_string()));
        }
        Ok(())
    }

    async fn set_driver(&self, id: Uuid, driver_id: Option<Uuid>) -> AppResult<()> {
        let result = sqlx::query("UPDATE orders SET driver_id = $2 WHERE id = $1")
            .bind(id)
            .bind(driver_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Order", &id.to_string()));
        }
        Ok(())
    }
}
