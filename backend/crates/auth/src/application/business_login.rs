//! Business Login Use Case (step 2)
//!
//! Completes the business operator login by validating the MFA code,
//! confirming the business membership, and minting the token pair.

use std::sync::Arc;

use kernel::id::BusinessMemberId;

use crate::domain::repository::{BusinessMemberRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use crate::mfa::MfaChallengeStore;
use crate::token::{TokenManager, TokenPair};

/// Business login input
pub struct BusinessLoginInput {
    pub email: String,
    pub mfa_code: String,
}

/// Business login output
pub struct BusinessLoginOutput {
    pub pair: TokenPair,
    pub business_id: BusinessMemberId,
}

/// Business login use case
pub struct BusinessLoginUseCase<U, B>
where
    U: UserRepository,
    B: BusinessMemberRepository,
{
    user_repo: Arc<U>,
    member_repo: Arc<B>,
    tokens: Arc<TokenManager>,
    mfa: Arc<MfaChallengeStore>,
}

impl<U, B> BusinessLoginUseCase<U, B>
where
    U: UserRepository,
    B: BusinessMemberRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        member_repo: Arc<B>,
        tokens: Arc<TokenManager>,
        mfa: Arc<MfaChallengeStore>,
    ) -> Self {
        Self {
            user_repo,
            member_repo,
            tokens,
            mfa,
        }
    }

    pub async fn execute(&self, input: BusinessLoginInput) -> AuthResult<BusinessLoginOutput> {
        let email = Email::new(input.email)?;

        // 1. MFA code first; failures here never reveal whether the
        //    account exists
        self.mfa.verify(email.as_str(), &input.mfa_code)?;

        // 2. The email must belong to an active business member
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotBusinessMember)?;

        if !user.role.is_business() {
            return Err(AuthError::NotBusinessMember);
        }

        let member = self
            .member_repo
            .find_by_user(&user.external_id)
            .await?
            .ok_or(AuthError::NotBusinessMember)?;

        // 3. Mint the bearer pair
        let pair = self.tokens.mint_pair(
            user.external_id.as_str(),
            user.email.as_str(),
            user.role,
        )?;

        tracing::info!(
            external_id = %user.external_id,
            business_id = %member.id,
            "Business operator signed in"
        );

        Ok(BusinessLoginOutput {
            pair,
            business_id: member.id,
        })
    }
}
