//! Directorio de clientes
//!
//! Búsqueda incremental, prellenado del formulario de alta a partir del texto
//! buscado, alta desde caja y auto-registro público.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::dto::client_dto::{CreateClientRequest, PublicRegistrationRequest};
use crate::models::{Client, NewClient};
use crate::repositories::ClientStore;
use crate::utils::errors::{validation_error, AppError, AppResult};

pub const MIN_QUERY_CHARS: usize = 2;
pub const SEARCH_LIMIT: i64 = 5;
/// Espera sugerida entre teclas antes de buscar; la aplica quien llama
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

pub const REQUIRED_REGISTRATION_MESSAGE: &str = "Nombre, apellido y teléfono son obligatorios.";
pub const REGISTRATION_SUCCESS_MESSAGE: &str = "¡Registro exitoso!";
pub const PUBLIC_REGISTRATION_NOTE: &str = "Registro via QR Tienda";

/// Nombre y apellido sugeridos a partir del texto buscado
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ClientPrefill {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegistrationOutcome {
    pub success: bool,
    pub message: String,
}

impl RegistrationOutcome {
    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// Menos de dos caracteres no llega al almacén
pub async fn search(clients: &dyn ClientStore, query: &str) -> AppResult<Vec<Client>> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }
    clients.search(query, SEARCH_LIMIT).await
}

/// Primer token como nombre, el resto como apellido
pub fn prefill(query: &str) -> ClientPrefill {
    match query.split_once(' ') {
        Some((first, rest)) => ClientPrefill {
            first_name: first.to_string(),
            last_name: rest.to_string(),
        },
        None => ClientPrefill {
            first_name: query.to_string(),
            last_name: String::new(),
        },
    }
}

/// Alta desde el formulario de caja; el cliente creado queda seleccionado
pub async fn create(clients: &dyn ClientStore, request: CreateClientRequest) -> AppResult<Client> {
    let full_name = NewClient::compose_full_name(&request.first_name, &request.last_name);
    if full_name.is_empty() {
        return Err(validation_error(
            "first_name",
            "El nombre del cliente es obligatorio.",
        ));
    }

    let new_client = NewClient {
        first_name: request.first_name.trim().to_uppercase(),
        last_name: request.last_name.trim().to_uppercase(),
        full_name,
        phone: optional_upper(request.phone),
        document_id: optional_upper(request.document_id),
        email: optional_upper(request.email),
        address: optional_upper(request.address),
        notes: None,
    };

    let client = clients.insert(&new_client).await?;
    info!("👤 Cliente creado: {}", client.full_name);
    Ok(client)
}

/// Auto-registro público (QR en tienda)
pub async fn register_public(
    clients: &dyn ClientStore,
    request: PublicRegistrationRequest,
) -> RegistrationOutcome {
    let first_name = request.first_name.trim();
    let last_name = request.last_name.trim();
    let phone = request.phone.trim();

    if first_name.is_empty() || last_name.is_empty() || phone.is_empty() {
        return RegistrationOutcome::failed(REQUIRED_REGISTRATION_MESSAGE.to_string());
    }

    let new_client = NewClient {
        first_name: first_name.to_uppercase(),
        last_name: last_name.to_uppercase(),
        full_name: NewClient::compose_full_name(first_name, last_name),
        phone: Some(phone.to_string()),
        document_id: non_empty(request.document_id),
        email: None,
        address: optional_upper(request.address),
        notes: Some(PUBLIC_REGISTRATION_NOTE.to_string()),
    };

    match clients.insert(&new_client).await {
        Ok(client) => {
            info!("📱 Registro público: {}", client.full_name);
            RegistrationOutcome {
                success: true,
                message: REGISTRATION_SUCCESS_MESSAGE.to_string(),
            }
        }
        Err(AppError::Conflict(message)) => RegistrationOutcome::failed(message),
        Err(e) => {
            warn!("⚠️ Error en registro público: {}", e);
            RegistrationOutcome::failed(format!("Error: {}", backend_message(&e)))
        }
    }
}

fn backend_message(error: &AppError) -> String {
    match error {
        AppError::Database(e) => e.to_string(),
        other => other.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional_upper(value: Option<String>) -> Option<String> {
    non_empty(value).map(|v| v.to_uppercase())
}
