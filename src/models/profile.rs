//! Modelo de Profile
//!
//! Perfil de operador con su rol (`admin` | `user`) y estado activo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Rol del operador - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    /// admin ⇄ user
    pub fn toggled(self) -> UserRole {
        match self {
            UserRole::Admin => UserRole::User,
            UserRole::User => UserRole::Admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_toggles_both_ways() {
        assert_eq!(UserRole::User.toggled(), UserRole::Admin);
        assert_eq!(UserRole::Admin.toggled(), UserRole::User);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let profile = Profile {
            id: Uuid::new_v4(),
            email: "caja@fastorder.com".to_string(),
            password_hash: "$2b$secret".to_string(),
            full_name: "CAJA".to_string(),
            role: UserRole::User,
            is_active: true,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }
}
