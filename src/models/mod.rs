//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! de `migrations/`.

pub mod client;
pub mod driver;
pub mod order;
pub mod profile;

pub use client::{Client, NewClient};
pub use driver::{DeliveryDriver, NewDriver};
pub use order::{ChangeKind, DeliveryType, InvoiceLine, NewOrder, Order, OrderChange, OrderStatus};
pub use profile::{NewProfile, Profile, UserRole};
