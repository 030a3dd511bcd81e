//! Refresh Use Case
//!
//! Exchanges a valid refresh token for a new access + refresh pair.
//! The old refresh token is not revoked; rotation is a documented
//! limitation of the current design.

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::external_id::ExternalId;
use crate::error::{AuthError, AuthResult};
use crate::token::{TokenManager, TokenPair, TokenType};

/// Refresh use case
pub struct RefreshUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenManager>,
}

impl<U> RefreshUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenManager>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.tokens.verify(refresh_token, Some(TokenType::Refresh))?;

        // The user must still exist and not be withdrawn; the repository
        // lookup excludes deleted users.
        let external_id = ExternalId::new(claims.sub)?;
        let user = self
            .user_repo
            .find_by_external_id(&external_id)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let pair = self.tokens.mint_pair(
            user.external_id.as_str(),
            user.email.as_str(),
            user.role,
        )?;

        tracing::debug!(external_id = %user.external_id, "Token pair refreshed");
        Ok(pair)
    }
}
