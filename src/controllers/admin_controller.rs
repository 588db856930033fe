use uuid::Uuid;

use crate::dto::admin_dto::{user_rows, UserRow};
use crate::repositories::Stores;
use crate::services::admin_panel::{self, AdminAccess};
use crate::services::auth_service::SessionStore;
use crate::utils::errors::AppResult;

pub struct AdminController {
    stores: Stores,
    sessions: SessionStore,
}

impl AdminController {
    pub fn new(stores: Stores, sessions: SessionStore) -> Self {
        Self { stores, sessions }
    }

    pub async fn authorize(&self, caller: Option<Uuid>) -> AppResult<AdminAccess> {
        admin_panel::authorize(self.stores.profiles.as_ref(), caller).await
    }

    pub async fn list(&self) -> AppResult<Vec<UserRow>> {
        Ok(user_rows(admin_panel::list(self.stores.profiles.as_ref()).await?))
    }

    pub async fn toggle_role(&self, id: Uuid) -> AppResult<Vec<UserRow>> {
        Ok(user_rows(
            admin_panel::toggle_role(self.stores.profiles.as_ref(), id).await?,
        ))
    }

    pub async fn toggle_active(&self, id: Uuid) -> AppResult<Vec<UserRow>> {
        Ok(user_rows(
            admin_panel::toggle_active(self.stores.profiles.as_ref(), &self.sessions, id).await?,
        ))
    }
}
