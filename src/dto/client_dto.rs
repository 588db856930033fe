use serde::Deserialize;
use validator::Validate;

// Query de búsqueda/prellenado
#[derive(Debug, Deserialize)]
pub struct ClientQuery {
    #[serde(default)]
    pub q: String,
}

// Request para crear un cliente desde caja
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(max = 100))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: String,
    pub phone: Option<String>,
    pub document_id: Option<String>,
    #[validate(length(max = 120))]
    pub email: Option<String>,
    pub address: Option<String>,
}

// Formulario público de registro (QR en tienda)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PublicRegistrationRequest {
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    pub phone: String,
    #[serde(alias = "documentId")]
    pub document_id: Option<String>,
    pub address: Option<String>,
}
