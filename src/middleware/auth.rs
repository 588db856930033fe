//! Middleware de autenticación JWT
//!
//! Este módulo maneja la extracción del token Bearer, su verificación y la
//! comprobación de que la sesión siga abierta. El operador autenticado se
//! inyecta como extensión de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Operador autenticado que se inyecta en las requests
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub profile_id: Uuid,
    pub session_id: Uuid,
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;

    let profile_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de perfil inválido".to_string()))?;
    let session_id = Uuid::parse_str(&claims.jti)
        .map_err(|_| AppError::Unauthorized("ID de sesión inválido".to_string()))?;

    // Un token vigente de una sesión cerrada ya no sirve
    if !state.sessions.is_active(session_id).await {
        return Err(AppError::Unauthorized("Sesión cerrada o expirada".to_string()));
    }

    request.extensions_mut().insert(AuthenticatedUser {
        profile_id,
        session_id,
    });

    Ok(next.run(request).await)
}

/// Resuelve el operador si hay un token válido, sin rechazar la request.
/// Lo usan las rutas que redirigen en lugar de responder 401.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| extract_token_from_header(value).ok())
        .map(str::to_string);

    if let Some(token) = token {
        if let Ok(claims) = verify_token(&token, &state.jwt) {
            let ids = Uuid::parse_str(&claims.sub)
                .ok()
                .zip(Uuid::parse_str(&claims.jti).ok());
            if let Some((profile_id, session_id)) = ids {
                if state.sessions.is_active(session_id).await {
                    request.extensions_mut().insert(AuthenticatedUser {
                        profile_id,
                        session_id,
                    });
                }
            }
        }
    }

    next.run(request).await
}
