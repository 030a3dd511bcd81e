//! Account Use Cases
//!
//! Withdrawal: logical deletion of the calling user followed by
//! revocation of the presented token.

use std::sync::Arc;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::external_id::ExternalId;
use crate::error::AuthResult;
use crate::token::{TokenManager, TokenType};

/// Withdraw (logical delete) use case
pub struct WithdrawUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenManager>,
}

impl<U> WithdrawUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenManager>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, access_token: &str) -> AuthResult<()> {
        let claims = self.tokens.verify(access_token, Some(TokenType::Access))?;
        let external_id = ExternalId::new(claims.sub)?;

        // Admin targets are rejected inside the repository
        self.user_repo.mark_deleted(&external_id).await?;

        // The session ends with the account; revocation of an
        // already-revoked token is silent
        self.tokens.revoke(access_token)?;

        tracing::info!(external_id = %external_id, "User withdrawn");
        Ok(())
    }
}
