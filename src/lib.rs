//! Fast Order
//!
//! Backend de captura y despacho de pedidos a domicilio: formulario de
//! captura por portapapeles, tablero de despacho en vivo, directorio de
//! clientes, planilla de domiciliarios y panel de roles.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_middleware, cors_middleware, optional_auth_middleware};
use crate::routes::{
    admin_routes, auth_routes, client_routes, driver_routes, intake_routes, order_routes,
};
use crate::state::AppState;

/// Arma el router completo de la API
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/api/auth", auth_routes::create_session_router())
        .nest("/api/intake", intake_routes::create_intake_router())
        .nest("/api/orders", order_routes::create_order_router())
        .nest("/api/clients", client_routes::create_client_router())
        .nest("/api/drivers", driver_routes::create_driver_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let admin = Router::new()
        .nest("/api/admin", admin_routes::create_admin_router())
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(auth_routes::create_login_router())
        .nest(
            "/api/registro",
            client_routes::create_registration_router(state.clone()),
        )
        .merge(protected)
        .merge(admin)
        .layer(cors_middleware(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "fast_order",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
