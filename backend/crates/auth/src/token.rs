//! Token Manager
//!
//! Mints, verifies, and revokes the signed bearer tokens (HS256 JWTs)
//! that protect the API. Revocation is process-local: a read-mostly
//! map from token to its own expiry, pruned hourly by a sweeper.
//! A restart clears the set, which is acceptable because access tokens
//! are short-lived and expiry is re-checked on every verify.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};
use crate::sweeper::{SweeperHandle, spawn_sweeper};

/// Token issuer
pub const DEFAULT_ISSUER: &str = "kojan-map";

/// Access token lifetime
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);
/// Refresh token lifetime
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// Revocation-set sweep interval
pub const REVOCATION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Bearer token type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Signed token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User external id
    pub sub: String,
    /// Email address
    pub email: String,
    /// Role at mint time
    pub role: UserRole,
    /// Access or refresh
    #[serde(rename = "tokenType")]
    pub token_type: TokenType,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Token id, echoed on logout
    pub jti: String,
}

/// A freshly minted access + refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Token manager configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret
    pub secret: Vec<u8>,
    /// Issuer claim value
    pub issuer: String,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// Create a config with the standard lifetimes
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            access_ttl: ACCESS_TOKEN_TTL,
            refresh_ttl: REFRESH_TOKEN_TTL,
        }
    }

    /// Development config with a random per-process secret
    pub fn development() -> Self {
        Self::new(platform::crypto::random_bytes(32))
    }
}

/// Token manager
///
/// Holds the signing keys and the process-local revocation set.
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    /// token -> token expiry (Unix ms). Read-mostly.
    revoked: RwLock<HashMap<String, i64>>,
}

impl TokenManager {
    pub fn new(config: TokenConfig) -> Self {
        // HMACのみ受理。他のアルゴリズムヘッダは署名検証前に拒否される。
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            issuer: config.issuer,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    // ========================================================================
    // Mint
    // ========================================================================

    /// Mint an access + refresh pair sharing subject, email, and role
    pub fn mint_pair(&self, external_id: &str, email: &str, role: UserRole) -> AuthResult<TokenPair> {
        let now = Utc::now();
        Ok(TokenPair {
            access: self.mint_at(external_id, email, role, TokenType::Access, self.access_ttl, now)?,
            refresh: self.mint_at(
                external_id,
                email,
                role,
                TokenType::Refresh,
                self.refresh_ttl,
                now,
            )?,
        })
    }

    fn mint_at(
        &self,
        external_id: &str,
        email: &str,
        role: UserRole,
        token_type: TokenType,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid token TTL: {e}")))?;
        let claims = Claims {
            sub: external_id.to_string(),
            email: email.to_string(),
            role,
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    // ========================================================================
    // Verify
    // ========================================================================

    /// Verify a token and return its claims
    ///
    /// Fails on bad signature, non-HMAC algorithm header, expiry, wrong
    /// issuer, type mismatch, or revocation.
    pub fn verify(&self, token: &str, expected_type: Option<TokenType>) -> AuthResult<Claims> {
        if self.is_revoked(token) {
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.decode_claims(token)?;

        if let Some(expected) = expected_type {
            if claims.token_type != expected {
                return Err(AuthError::TokenTypeMismatch);
            }
        }

        Ok(claims)
    }

    /// Whether the token is in the revocation set
    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked
            .read()
            .expect("revocation lock poisoned")
            .contains_key(token)
    }

    fn decode_claims(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Bearer token rejected");
                AuthError::TokenInvalid
            })
    }

    // ========================================================================
    // Revoke
    // ========================================================================

    /// Revoke a token (logout). Returns the token id (`jti`).
    ///
    /// The token must be otherwise valid; a forged or expired token never
    /// enters the set. Revoking an already-revoked token succeeds and
    /// returns the same id.
    pub fn revoke(&self, token: &str) -> AuthResult<String> {
        // 失効済みでも decode は通るため、再実行は自然に冪等になる
        let claims = self.decode_claims(token)?;

        self.revoked
            .write()
            .expect("revocation lock poisoned")
            .insert(token.to_string(), claims.exp * 1000);

        tracing::info!(jti = %claims.jti, sub = %claims.sub, "Token revoked");
        Ok(claims.jti)
    }

    // ========================================================================
    // Sweeping
    // ========================================================================

    /// Drop revocation entries whose own expiry has passed
    pub fn sweep_expired(&self) -> usize {
        let now_ms = Utc::now().timestamp_millis();
        let mut revoked = self.revoked.write().expect("revocation lock poisoned");
        let before = revoked.len();
        revoked.retain(|_, expires_at_ms| *expires_at_ms > now_ms);
        before - revoked.len()
    }

    /// Spawn the hourly revocation sweeper
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let manager = Arc::clone(self);
        spawn_sweeper("token-revocations", REVOCATION_SWEEP_INTERVAL, move || {
            manager.sweep_expired()
        })
    }

    /// Number of live revocation entries (for observability)
    pub fn revoked_len(&self) -> usize {
        self.revoked.read().expect("revocation lock poisoned").len()
    }
}
