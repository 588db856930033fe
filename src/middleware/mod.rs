//! Middleware del sistema
//!
//! Este módulo contiene el middleware para autenticación, CORS y rate limiting.

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::{auth_middleware, optional_auth_middleware, AuthenticatedUser};
pub use cors::cors_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimitState};
