use crate::dto::client_dto::{CreateClientRequest, PublicRegistrationRequest};
use crate::models::Client;
use crate::repositories::Stores;
use crate::services::client_directory::{self, ClientPrefill, RegistrationOutcome};
use crate::utils::errors::AppResult;

pub struct ClientController {
    stores: Stores,
}

impl ClientController {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<Client>> {
        client_directory::search(self.stores.clients.as_ref(), query).await
    }

    pub fn prefill(&self, query: &str) -> ClientPrefill {
        client_directory::prefill(query)
    }

    pub async fn create(&self, request: CreateClientRequest) -> AppResult<Client> {
        client_directory::create(self.stores.clients.as_ref(), request).await
    }

    pub async fn register_public(&self, request: PublicRegistrationRequest) -> RegistrationOutcome {
        client_directory::register_public(self.stores.clients.as_ref(), request).await
    }
}
