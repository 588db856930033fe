//! Servicio de autenticación
//!
//! Login con contraseña (bcrypt) contra `profiles`, emisión de JWT y registro
//! de sesiones activas en memoria. Logout elimina la sesión aunque el token
//! siga vigente.

use std::collections::HashMap;
use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{NewProfile, Profile, UserRole};
use crate::repositories::ProfileStore;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Credenciales inválidas";

/// Sesión emitida en un login
#[derive(Debug, Clone)]
pub struct Session {
    pub profile_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Sesiones activas indexadas por `jti`
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session_id: Uuid, session: Session) {
        self.sessions.write().await.insert(session_id, session);
    }

    /// La sesión existe y no expiró
    pub async fn is_active(&self, session_id: Uuid) -> bool {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .map(|s| !s.is_expired())
            .unwrap_or(false)
    }

    pub async fn remove(&self, session_id: Uuid) -> bool {
        self.sessions.write().await.remove(&session_id).is_some()
    }

    /// Cierra todas las sesiones de un perfil. Devuelve cuántas se cerraron.
    pub async fn revoke_profile(&self, profile_id: Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.profile_id != profile_id);
        before - sessions.len()
    }

    /// Limpiar sesiones expiradas
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        before - sessions.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: Profile,
}

pub fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    hash(password, cost).map_err(|e| AppError::Hash(e.to_string()))
}

pub async fn login(
    profiles: &dyn ProfileStore,
    sessions: &SessionStore,
    jwt: &JwtConfig,
    email: &str,
    password: &str,
) -> AppResult<LoginOutcome> {
    let profile = profiles
        .find_by_email(email.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let valid = verify(password, &profile.password_hash).unwrap_or(false);
    if !valid {
        warn!("🔒 Contraseña incorrecta para {}", profile.email);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !profile.is_active {
        return Err(AppError::Unauthorized("Usuario inactivo".to_string()));
    }

    let session_id = Uuid::new_v4();
    let token = generate_token(profile.id, profile.role, session_id, jwt)?;
    let created_at = Utc::now();
    let expires_at = created_at + chrono::Duration::seconds(jwt.expiration as i64);

    sessions
        .insert(
            session_id,
            Session {
                profile_id: profile.id,
                created_at,
                expires_at,
            },
        )
        .await;

    info!("🔑 Login de {} ({})", profile.email, profile.role.as_str());
    Ok(LoginOutcome {
        token,
        expires_at,
        profile,
    })
}

pub async fn logout(sessions: &SessionStore, session_id: Uuid) {
    if sessions.remove(session_id).await {
        info!("👋 Sesión {} cerrada", session_id);
    }
}

pub async fn me(profiles: &dyn ProfileStore, profile_id: Uuid) -> AppResult<Profile> {
    profiles
        .find_by_id(profile_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Perfil no encontrado".to_string()))
}

/// Crea el administrador inicial si aún no existe un perfil con ese email
pub async fn bootstrap_admin(
    profiles: &dyn ProfileStore,
    email: &str,
    password: &str,
) -> AppResult<Option<Profile>> {
    if profiles.find_by_email(email).await?.is_some() {
        return Ok(None);
    }

    let profile = profiles
        .insert(&NewProfile {
            email: email.to_string(),
            password_hash: hash_password(password, DEFAULT_COST)?,
            full_name: "ADMINISTRADOR".to_string(),
            role: UserRole::Admin,
        })
        .await?;

    info!("🛡️ Administrador inicial creado: {}", profile.email);
    Ok(Some(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use crate::utils::jwt::verify_token;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "secreto".to_string(),
            expiration: 3600,
        }
    }

    async fn seed(store: &MemoryStore, email: &str, password: &str) -> Profile {
        ProfileStore::insert(
            store,
            &NewProfile {
                email: email.to_string(),
                password_hash: hash_password(password, 4).unwrap(),
                full_name: "CAJA".to_string(),
                role: UserRole::User,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn login_issues_token_and_session() {
        let store = MemoryStore::new();
        let sessions = SessionStore::new();
        let profile = seed(&store, "caja@fastorder.com", "clave123").await;

        let outcome = login(&store, &sessions, &jwt(), "caja@fastorder.com", "clave123")
            .await
            .unwrap();
        let claims = verify_token(&outcome.token, &jwt()).unwrap();
        assert_eq!(claims.sub, profile.id.to_string());

        let session_id = Uuid::parse_str(&claims.jti).unwrap();
        assert!(sessions.is_active(session_id).await);

        logout(&sessions, session_id).await;
        assert!(!sessions.is_active(session_id).await);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_unauthorized() {
        let store = MemoryStore::new();
        let sessions = SessionStore::new();
        seed(&store, "caja@fastorder.com", "clave123").await;

        assert!(matches!(
            login(&store, &sessions, &jwt(), "caja@fastorder.com", "otra").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            login(&store, &sessions, &jwt(), "nadie@fastorder.com", "clave123").await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn inactive_profiles_cannot_log_in() {
        let store = MemoryStore::new();
        let sessions = SessionStore::new();
        let profile = seed(&store, "caja@fastorder.com", "clave123").await;
        store.set_active(profile.id, false).await.unwrap();

        assert!(login(&store, &sessions, &jwt(), "caja@fastorder.com", "clave123")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn revoking_a_profile_closes_only_its_sessions() {
        let store = MemoryStore::new();
        let sessions = SessionStore::new();
        seed(&store, "caja@fastorder.com", "clave123").await;
        seed(&store, "otra@fastorder.com", "clave123").await;

        let caja = login(&store, &sessions, &jwt(), "caja@fastorder.com", "clave123")
            .await
            .unwrap();
        let otra = login(&store, &sessions, &jwt(), "otra@fastorder.com", "clave123")
            .await
            .unwrap();
        let session_of = |token: &str| {
            Uuid::parse_str(&verify_token(token, &jwt()).unwrap().jti).unwrap()
        };

        assert_eq!(sessions.revoke_profile(caja.profile.id).await, 1);
        assert!(!sessions.is_active(session_of(&caja.token)).await);
        assert!(sessions.is_active(session_of(&otra.token)).await);
    }

    #[tokio::test]
    async fn bootstrap_admin_runs_once() {
        let store = MemoryStore::new();
        let created = bootstrap_admin(&store, "admin@fastorder.com", "admin").await.unwrap();
        assert_eq!(created.unwrap().role, UserRole::Admin);
        assert!(bootstrap_admin(&store, "admin@fastorder.com", "admin")
            .await
            .unwrap()
            .is_none());
    }
}
