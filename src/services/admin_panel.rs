//! Panel de roles
//!
//! Solo administradores. El perfil de quien llama se resuelve de nuevo en
//! cada solicitud; cada cambio es un update de una fila seguido de una
//! recarga completa de la lista.

use tracing::info;
use uuid::Uuid;

use crate::models::{Profile, UserRole};
use crate::repositories::ProfileStore;
use crate::services::auth_service::SessionStore;
use crate::utils::errors::{not_found_error, AppResult};

pub const LOGIN_PATH: &str = "/login";
pub const BOARD_PATH: &str = "/pedidos";

/// Resultado de la verificación de acceso al panel
#[derive(Debug, Clone, PartialEq)]
pub enum AdminAccess {
    Granted(Profile),
    RedirectLogin,
    RedirectBoard,
}

impl AdminAccess {
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            AdminAccess::Granted(_) => None,
            AdminAccess::RedirectLogin => Some(LOGIN_PATH),
            AdminAccess::RedirectBoard => Some(BOARD_PATH),
        }
    }
}

pub async fn authorize(profiles: &dyn ProfileStore, caller: Option<Uuid>) -> AppResult<AdminAccess> {
    let Some(caller) = caller else {
        return Ok(AdminAccess::RedirectLogin);
    };

    Ok(match profiles.find_by_id(caller).await? {
        None => AdminAccess::RedirectLogin,
        Some(profile) if !profile.is_active => AdminAccess::RedirectLogin,
        Some(profile) if profile.role == UserRole::Admin => AdminAccess::Granted(profile),
        Some(_) => AdminAccess::RedirectBoard,
    })
}

/// Todos los perfiles, más recientes primero
pub async fn list(profiles: &dyn ProfileStore) -> AppResult<Vec<Profile>> {
    profiles.list_all().await
}

/// admin ⇄ user, luego recarga
pub async fn toggle_role(profiles: &dyn ProfileStore, id: Uuid) -> AppResult<Vec<Profile>> {
    let profile = find(profiles, id).await?;
    let role = profile.role.toggled();
    profiles.set_role(id, role).await?;
    info!("🔑 Rol de {} → {}", profile.email, role.as_str());
    list(profiles).await
}

/// Al desactivar un perfil se cierran sus sesiones abiertas
pub async fn toggle_active(
    profiles: &dyn ProfileStore,
    sessions: &SessionStore,
    id: Uuid,
) -> AppResult<Vec<Profile>> {
    let profile = find(profiles, id).await?;
    let is_active = !profile.is_active;
    profiles.set_active(id, is_active).await?;
    info!("🔑 Perfil {} activo={}", profile.email, is_active);

    if !is_active {
        let closed = sessions.revoke_profile(id).await;
        if closed > 0 {
            info!("🔒 {} sesiones de {} cerradas", closed, profile.email);
        }
    }
    list(profiles).await
}

async fn find(profiles: &dyn ProfileStore, id: Uuid) -> AppResult<Profile> {
    profiles
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found_error("Profile", &id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use crate::services::auth_service::Session;
    use chrono::Utc;

    #[tokio::test]
    async fn gate_redirects_missing_and_non_admin_callers() {
        let store = MemoryStore::new();
        let user = store.seed_profile("caja@fastorder.com", "CAJA", UserRole::User);
        let admin = store.seed_profile("admin@fastorder.com", "ADMIN", UserRole::Admin);

        assert_eq!(authorize(&store, None).await.unwrap(), AdminAccess::RedirectLogin);
        assert_eq!(
            authorize(&store, Some(Uuid::new_v4())).await.unwrap(),
            AdminAccess::RedirectLogin
        );
        assert_eq!(authorize(&store, Some(user.id)).await.unwrap(), AdminAccess::RedirectBoard);
        assert!(matches!(
            authorize(&store, Some(admin.id)).await.unwrap(),
            AdminAccess::Granted(_)
        ));
    }

    #[tokio::test]
    async fn toggling_role_is_visible_after_refetch() {
        let store = MemoryStore::new();
        let user = store.seed_profile("caja@fastorder.com", "CAJA", UserRole::User);

        let listed = toggle_role(&store, user.id).await.unwrap();
        let updated = listed.iter().find(|p| p.id == user.id).unwrap();
        assert_eq!(updated.role, UserRole::Admin);

        let listed = toggle_role(&store, user.id).await.unwrap();
        assert_eq!(listed[0].role, UserRole::User);
    }

    #[tokio::test]
    async fn toggling_active_flips_flag() {
        let store = MemoryStore::new();
        let user = store.seed_profile("caja@fastorder.com", "CAJA", UserRole::User);
        let listed = toggle_active(&store, &SessionStore::new(), user.id).await.unwrap();
        assert!(!listed[0].is_active);
    }

    #[tokio::test]
    async fn deactivation_closes_sessions_and_blocks_the_panel() {
        let store = MemoryStore::new();
        let sessions = SessionStore::new();
        let admin = store.seed_profile("admin@fastorder.com", "ADMIN", UserRole::Admin);
        let session_id = Uuid::new_v4();
        sessions
            .insert(
                session_id,
                Session {
                    profile_id: admin.id,
                    created_at: Utc::now(),
                    expires_at: Utc::now() + chrono::Duration::hours(1),
                },
            )
            .await;

        toggle_active(&store, &sessions, admin.id).await.unwrap();
        assert!(!sessions.is_active(session_id).await);
        assert_eq!(authorize(&store, Some(admin.id)).await.unwrap(), AdminAccess::RedirectLogin);

        toggle_active(&store, &sessions, admin.id).await.unwrap();
        assert!(matches!(
            authorize(&store, Some(admin.id)).await.unwrap(),
            AdminAccess::Granted(_)
        ));
    }

    #[tokio::test]
    async fn role_is_re_resolved_on_every_request() {
        let store = MemoryStore::new();
        let admin = store.seed_profile("admin@fastorder.com", "ADMIN", UserRole::Admin);
        assert!(matches!(
            authorize(&store, Some(admin.id)).await.unwrap(),
            AdminAccess::Granted(_)
        ));

        store.set_role(admin.id, UserRole::User).await.unwrap();
        assert_eq!(authorize(&store, Some(admin.id)).await.unwrap(), AdminAccess::RedirectBoard);
    }
}
