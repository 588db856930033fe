use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{like_pattern, ClientStore};
use crate::models::{Client, NewClient};
use crate::utils::errors::{map_unique_violation, AppResult};

pub const DUPLICATE_PHONE_MESSAGE: &str = "Ya existe un cliente registrado con ese teléfono.";

pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for ClientRepository {
    async fn search(&self, term: &str, limit: i64) -> AppResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE full_name ILIKE $1 OR phone ILIKE $1 OR document_id ILIKE $1
            LIMIT $2
            "#,
        )
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn insert(&self, client: &NewClient) -> AppResult<Client> {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (first_name, last_name, full_name, phone, document_id, email, address, notes, total_orders)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0)
            RETURNING *
            "#,
        )
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.full_name)
        .bind(&client.phone)
        .bind(&client.document_id)
        .bind(&client.email)
        .bind(&client.address)
        .bind(&client.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_PHONE_MESSAGE))
    }
}
