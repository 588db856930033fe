//! DTOs de la API
//!
//! Requests y responses JSON de cada recurso. Los requests con reglas de
//! entrada usan `validator`.

pub mod admin_dto;
pub mod api_response;
pub mod auth_dto;
pub mod client_dto;
pub mod driver_dto;
pub mod intake_dto;
pub mod order_dto;

pub use api_response::ApiResponse;
