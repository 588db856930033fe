use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::ProfileStore;
use crate::models::{NewProfile, Profile, UserRole};
use crate::utils::errors::{map_unique_violation, not_found_error, AppResult};

pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        let profile =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE lower(email) = lower($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(profile)
    }

    async fn list_all(&self) -> AppResult<Vec<Profile>> {
        let profiles =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY updated_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(profiles)
    }

    async fn insert(&self, profile: &NewProfile) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (email, password_hash, full_name, role, is_active, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, NOW())
            RETURNING *
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.password_hash)
        .bind(&profile.full_name)
        .bind(profile.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "El email ya está registrado"))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<()> {
        let result = sqlx::query("UPDATE profiles SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Profile", &id.to_string()));
        }
        Ok(())
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE profiles SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(is_active)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Profile", &id.to_string()));
        }
        Ok(())
    }
}
