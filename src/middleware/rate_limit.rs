//! Middleware de Rate Limiting
//!
//! Este módulo limita la cantidad de requests por IP en los endpoints
//! públicos (registro por QR) para prevenir abuso.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::environment::EnvironmentConfig;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Estructura para almacenar información de rate limiting por IP
#[derive(Debug, Clone)]
struct RateLimitInfo {
    requests: u32,
    window_start: Instant,
}

/// Estado global del rate limiting
#[derive(Clone)]
pub struct RateLimitState {
    requests: Arc<RwLock<HashMap<String, RateLimitInfo>>>,
    max_requests: u32,
    window_duration: Duration,
    trust_proxy: bool,
}

impl RateLimitState {
    /// Crear nuevo estado de rate limiting
    pub fn new(config: &EnvironmentConfig) -> Self {
        let mut state = Self::with_limits(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window),
        );
        state.trust_proxy = config.trust_proxy;
        state
    }

    pub fn with_limits(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window_duration,
            trust_proxy: false,
        }
    }

    /// Verificar si una IP ha excedido el límite
    pub async fn check_rate_limit(&self, ip: &str) -> Result<(), AppError> {
        let mut requests = self.requests.write().await;
        let now = Instant::now();

        // Limpiar entradas expiradas
        requests.retain(|_, info| now.duration_since(info.window_start) < self.window_duration);

        let info = requests.entry(ip.to_string()).or_insert(RateLimitInfo {
            requests: 0,
            window_start: now,
        });

        if info.requests >= self.max_requests {
            return Err(AppError::RateLimitExceeded);
        }

        info.requests += 1;
        Ok(())
    }
}

/// IP del cliente: la del socket, o el primer salto de `x-forwarded-for`
/// cuando el servidor corre detrás de un proxy confiable
fn client_ip(request: &Request, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| {
            request
                .headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.split(',').next())
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
        })
        .flatten();

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware de rate limiting
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request, state.rate_limit.trust_proxy);
    state.rate_limit.check_rate_limit(&ip).await?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn limit_applies_per_ip() {
        let state = RateLimitState::with_limits(2, Duration::from_secs(60));
        assert!(state.check_rate_limit("1.1.1.1").await.is_ok());
        assert!(state.check_rate_limit("1.1.1.1").await.is_ok());
        assert!(matches!(
            state.check_rate_limit("1.1.1.1").await,
            Err(AppError::RateLimitExceeded)
        ));
        assert!(state.check_rate_limit("2.2.2.2").await.is_ok());
    }

    fn request(peer: &str, forwarded: &str) -> Request {
        let mut request = axum::http::Request::builder()
            .header("x-forwarded-for", forwarded)
            .body(axum::body::Body::empty())
            .unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    #[test]
    fn forwarded_header_is_ignored_without_trusted_proxy() {
        let first = request("10.0.0.5:4000", "1.1.1.1");
        let second = request("10.0.0.5:4001", "9.9.9.9");
        assert_eq!(client_ip(&first, false), "10.0.0.5");
        assert_eq!(client_ip(&second, false), "10.0.0.5");
    }

    #[test]
    fn trusted_proxy_uses_first_forwarded_hop() {
        let request = request("10.0.0.1:4000", "1.1.1.1, 10.0.0.1");
        assert_eq!(client_ip(&request, true), "1.1.1.1");
    }
}
