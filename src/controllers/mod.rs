//! Controladores
//!
//! Capa delgada entre las rutas y los servicios: arma los componentes con
//! los almacenes del estado y convierte sus resultados en DTOs.

pub mod admin_controller;
pub mod auth_controller;
pub mod client_controller;
pub mod driver_controller;
pub mod intake_controller;
pub mod order_controller;
