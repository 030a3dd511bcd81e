//! Google Login Use Case
//!
//! First step for both general users and business operators. Verifies
//! the Google ID token, finds or creates the user, then either mints a
//! token pair (general) or opens an MFA challenge (business).

use std::sync::Arc;

use platform::google::TokenVerifier;
use platform::notify::NotificationSender;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, external_id::ExternalId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};
use crate::mfa::MfaChallengeStore;
use crate::token::{TokenManager, TokenPair};

/// Google login input
pub struct GoogleLoginInput {
    /// Google ID token from the frontend sign-in flow
    pub id_token: String,
    /// Claimed role (general or business)
    pub role: UserRole,
}

/// Google login output
pub enum GoogleLoginOutput {
    /// General users get tokens immediately
    Tokens { pair: TokenPair, user: User },
    /// Business operators must pass MFA first; no tokens yet
    MfaPending {
        session_handle: String,
        user: User,
    },
}

/// Google login use case
pub struct GoogleLoginUseCase<U, V, N>
where
    U: UserRepository,
    V: TokenVerifier,
    N: NotificationSender,
{
    user_repo: Arc<U>,
    verifier: Arc<V>,
    notifier: Arc<N>,
    tokens: Arc<TokenManager>,
    mfa: Arc<MfaChallengeStore>,
    config: Arc<AuthConfig>,
}

impl<U, V, N> GoogleLoginUseCase<U, V, N>
where
    U: UserRepository,
    V: TokenVerifier,
    N: NotificationSender,
{
    pub fn new(
        user_repo: Arc<U>,
        verifier: Arc<V>,
        notifier: Arc<N>,
        tokens: Arc<TokenManager>,
        mfa: Arc<MfaChallengeStore>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            verifier,
            notifier,
            tokens,
            mfa,
            config,
        }
    }

    pub async fn execute(&self, input: GoogleLoginInput) -> AuthResult<GoogleLoginOutput> {
        if !input.role.is_claimable() {
            return Err(AuthError::NotBusinessMember);
        }

        // 1. Verify the ID token against Google (issuer, audience, expiry)
        let google_claims = self.verifier.verify(&input.id_token).await?;

        let external_id = ExternalId::new(google_claims.sub)?;
        let email = Email::new(google_claims.email)?;

        // 2. Find or create the user record
        let user = self
            .user_repo
            .find_or_create(&external_id, &email, input.role)
            .await?;

        // The persisted role governs, not the claimed one: an operator
        // re-claiming "general" still goes through MFA.
        if user.role.is_business() {
            // 3a. Open an MFA challenge; tokens are withheld until step 2
            let code = self.mfa.generate(user.email.as_str());
            self.notifier
                .send_mfa_code(user.email.as_str(), &code)
                .await?;

            let session_handle =
                platform::crypto::random_hex(self.config.session_handle_bytes);

            tracing::info!(external_id = %user.external_id, "Business login pending MFA");
            return Ok(GoogleLoginOutput::MfaPending {
                session_handle,
                user,
            });
        }

        // 3b. General users authenticate in one step
        let pair = self.tokens.mint_pair(
            user.external_id.as_str(),
            user.email.as_str(),
            user.role,
        )?;

        tracing::info!(external_id = %user.external_id, role = %user.role, "User signed in");
        Ok(GoogleLoginOutput::Tokens { pair, user })
    }
}
