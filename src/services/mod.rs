//! Services module
//!
//! Este módulo contiene la lógica de negocio de Fast Order. Cada componente
//! (captura, tablero, directorio, planilla, panel de roles) es una estructura
//! o un conjunto de funciones que trabaja contra los traits de repositorio,
//! de modo que los handlers HTTP y las pruebas lo usan de la misma forma.

pub mod admin_panel;
pub mod auth_service;
pub mod change_feed;
pub mod client_directory;
pub mod dispatch_board;
pub mod driver_roster;
pub mod intake_flow;
pub mod magic_paste;
pub mod order_code;

pub use auth_service::SessionStore;
pub use dispatch_board::{BoardStats, DispatchBoard};
pub use driver_roster::DriverRoster;
pub use intake_flow::{IntakeFlow, PasteStep};
