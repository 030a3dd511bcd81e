//! Auth Middleware
//!
//! Resolves the bearer token through the Token Manager and attaches the
//! caller's identity to the request extensions.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::client::{extract_bearer_token, extract_client_ip};

use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthError;
use crate::token::{TokenManager, TokenType};

fn client_ip_of(req: &Request<Body>) -> Option<std::net::IpAddr> {
    let direct = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());
    extract_client_ip(req.headers(), direct)
}

/// Authenticated caller identity, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    /// User external id (token subject)
    pub external_id: String,
    /// Email address
    pub email: String,
    /// Role at token mint time
    pub role: UserRole,
}

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub tokens: Arc<TokenManager>,
}

/// Middleware that requires a valid access token
pub async fn require_auth(
    axum::extract::State(state): axum::extract::State<AuthMiddlewareState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(req.headers()).map_err(|e| {
        tracing::debug!(error = %e, "Missing or malformed bearer credential");
        AuthError::TokenInvalid.into_response()
    })?;

    let claims = state
        .tokens
        .verify(token, Some(TokenType::Access))
        .map_err(|e| {
            tracing::warn!(client_ip = ?client_ip_of(&req), "Rejected bearer credential");
            e.into_response()
        })?;

    req.extensions_mut().insert(AuthIdentity {
        external_id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Middleware for public routes that still honor a presented token
///
/// No Authorization header lets the request through anonymously, but a
/// presented token must be valid: a revoked or expired credential is
/// rejected rather than silently ignored.
pub async fn optional_auth(
    axum::extract::State(state): axum::extract::State<AuthMiddlewareState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    if req.headers().get(axum::http::header::AUTHORIZATION).is_none() {
        return Ok(next.run(req).await);
    }

    let token = extract_bearer_token(req.headers())
        .map_err(|_| AuthError::TokenInvalid.into_response())?;

    let claims = state
        .tokens
        .verify(token, Some(TokenType::Access))
        .map_err(|e| e.into_response())?;

    req.extensions_mut().insert(AuthIdentity {
        external_id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(req).await)
}
