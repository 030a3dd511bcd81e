//! Client request utilities
//!
//! Common functions for reading credentials and client identity
//! from HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Error when extracting the bearer credential
#[derive(Debug, Clone, thiserror::Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Authorization header is not a Bearer credential")]
    NotBearer,
    #[error("Bearer credential is empty")]
    EmptyToken,
}

/// Extract the bearer token from the `Authorization` header
///
/// Expects the exact `Bearer <token>` scheme; anything else is rejected
/// so that malformed credentials fail before reaching token verification.
///
/// ## Returns
/// * `Ok(&str)` - the raw token string
/// * `Err(BearerError)` - header missing, wrong scheme, or empty token
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(BearerError::MissingHeader)?;

    const BEARER_SCHEME: &str = "Bearer ";
    let token = value
        .strip_prefix(BEARER_SCHEME)
        .ok_or(BearerError::NotBearer)?;

    if token.is_empty() {
        return Err(BearerError::EmptyToken);
    }

    Ok(token)
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // Check X-Forwarded-For header (first IP in the list)
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}
