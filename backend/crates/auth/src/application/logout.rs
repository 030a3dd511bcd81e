//! Logout Use Case
//!
//! Revokes the presented access token. Repeated logout with the same
//! token succeeds silently; verification keeps failing afterwards.

use std::sync::Arc;

use crate::error::AuthResult;
use crate::token::TokenManager;

/// Logout output
pub struct LogoutOutput {
    /// The `jti` of the revoked token
    pub revoked_token_id: String,
}

/// Logout use case
pub struct LogoutUseCase {
    tokens: Arc<TokenManager>,
}

impl LogoutUseCase {
    pub fn new(tokens: Arc<TokenManager>) -> Self {
        Self { tokens }
    }

    pub fn execute(&self, access_token: &str) -> AuthResult<LogoutOutput> {
        let revoked_token_id = self.tokens.revoke(access_token)?;
        Ok(LogoutOutput { revoked_token_id })
    }
}
