pub mod admin_routes;
pub mod auth_routes;
pub mod client_routes;
pub mod driver_routes;
pub mod intake_routes;
pub mod order_routes;
