use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Profile, UserRole};

// Fila del panel de roles
#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for UserRow {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
            is_active: profile.is_active,
            updated_at: profile.updated_at,
        }
    }
}

pub fn user_rows(profiles: Vec<Profile>) -> Vec<UserRow> {
    profiles.into_iter().map(UserRow::from).collect()
}
