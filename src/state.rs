//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::models::OrderChange;
use crate::repositories::Stores;
use crate::services::auth_service::SessionStore;
use crate::services::intake_flow::IntakeFlow;
use crate::services::magic_paste::MagicPasteParser;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::JwtConfig;

/// Formularios sin actividad durante este tiempo se descartan
pub const INTAKE_MAX_IDLE_HOURS: i64 = 12;

/// Formulario abierto y el momento de su última modificación
#[derive(Debug, Clone)]
pub struct IntakeEntry {
    pub flow: IntakeFlow,
    pub touched_at: DateTime<Utc>,
}

impl IntakeEntry {
    fn new(flow: IntakeFlow) -> Self {
        Self {
            flow,
            touched_at: Utc::now(),
        }
    }
}

/// Formularios de captura abiertos, uno por operador
pub type IntakeSessions = Arc<RwLock<HashMap<Uuid, IntakeEntry>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub stores: Stores,
    pub jwt: JwtConfig,
    pub sessions: SessionStore,
    pub intake_sessions: IntakeSessions,
    pub changes: broadcast::Sender<OrderChange>,
    pub rate_limit: RateLimitState,
    pub magic_paste: Arc<MagicPasteParser>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        stores: Stores,
        changes: broadcast::Sender<OrderChange>,
    ) -> AppResult<Self> {
        Ok(Self {
            jwt: JwtConfig::from(&config),
            rate_limit: RateLimitState::new(&config),
            magic_paste: Arc::new(MagicPasteParser::new()?),
            config,
            stores,
            sessions: SessionStore::new(),
            intake_sessions: Arc::new(RwLock::new(HashMap::new())),
            changes,
        })
    }

    /// Abrir un formulario de captura nuevo
    pub async fn open_intake(&self, flow: IntakeFlow) -> (Uuid, IntakeFlow) {
        let id = Uuid::new_v4();
        let mut sessions = self.intake_sessions.write().await;
        sessions.insert(id, IntakeEntry::new(flow.clone()));
        info!("📝 Formulario {} abierto ({} activos)", id, sessions.len());
        (id, flow)
    }

    /// Ejecuta `apply` sobre el formulario y devuelve su estado resultante
    pub async fn with_intake<T, F>(&self, id: Uuid, apply: F) -> AppResult<(T, IntakeFlow)>
    where
        F: FnOnce(&mut IntakeFlow) -> AppResult<T>,
    {
        let mut sessions = self.intake_sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or_else(|| intake_not_found(id))?;
        let result = apply(&mut entry.flow)?;
        entry.touched_at = Utc::now();
        Ok((result, entry.flow.clone()))
    }

    pub async fn intake_snapshot(&self, id: Uuid) -> AppResult<IntakeFlow> {
        self.intake_sessions
            .read()
            .await
            .get(&id)
            .map(|entry| entry.flow.clone())
            .ok_or_else(|| intake_not_found(id))
    }

    pub async fn close_intake(&self, id: Uuid) {
        self.intake_sessions.write().await.remove(&id);
    }

    /// Descarta formularios abandonados. Devuelve cuántos se eliminaron.
    pub async fn cleanup_stale_intakes(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.intake_sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.touched_at > cutoff);
        before - sessions.len()
    }
}

fn intake_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Formulario de captura '{}' no encontrado", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;

    fn state() -> AppState {
        let (changes, _) = broadcast::channel(16);
        let store = Arc::new(MemoryStore::new());
        AppState::new(EnvironmentConfig::default(), Stores::memory(store), changes).unwrap()
    }

    #[tokio::test]
    async fn idle_intakes_are_evicted() {
        let state = state();
        let (stale, _) = state.open_intake(IntakeFlow::new("PED-0001A".into())).await;
        let (fresh, _) = state.open_intake(IntakeFlow::new("PED-0002A".into())).await;

        if let Some(entry) = state.intake_sessions.write().await.get_mut(&stale) {
            entry.touched_at = Utc::now() - Duration::hours(INTAKE_MAX_IDLE_HOURS + 1);
        }

        let removed = state
            .cleanup_stale_intakes(Duration::hours(INTAKE_MAX_IDLE_HOURS))
            .await;
        assert_eq!(removed, 1);
        assert!(state.intake_snapshot(stale).await.is_err());
        assert!(state.intake_snapshot(fresh).await.is_ok());
    }

    #[tokio::test]
    async fn edits_keep_an_intake_alive() {
        let state = state();
        let (id, _) = state.open_intake(IntakeFlow::new("PED-0001A".into())).await;
        if let Some(entry) = state.intake_sessions.write().await.get_mut(&id) {
            entry.touched_at = Utc::now() - Duration::hours(INTAKE_MAX_IDLE_HOURS + 1);
        }

        state
            .with_intake(id, |flow| {
                flow.set_client_name("ANA");
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(
            state.cleanup_stale_intakes(Duration::hours(INTAKE_MAX_IDLE_HOURS)).await,
            0
        );
    }
}
