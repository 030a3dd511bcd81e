//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use std::str::FromStr;
use std::sync::Arc;

use platform::client::extract_bearer_token;
use platform::google::TokenVerifier;
use platform::notify::NotificationSender;

use crate::application::config::AuthConfig;
use crate::application::{
    BusinessLoginInput, BusinessLoginUseCase, GoogleLoginInput, GoogleLoginOutput,
    GoogleLoginUseCase, LogoutUseCase, RefreshUseCase, WithdrawUseCase,
};
use crate::domain::repository::{BusinessMemberRepository, UserRepository};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};
use crate::mfa::MfaChallengeStore;
use crate::presentation::dto::{
    BusinessLoginRequest, BusinessLoginResponse, GoogleLoginRequest, GoogleLoginResponse,
    LogoutResponse, MeResponse, RefreshRequest, RefreshResponse,
};
use crate::presentation::middleware::AuthIdentity;
use crate::token::TokenManager;

/// Shared state for auth handlers
pub struct AuthAppState<U, B, V, N>
where
    U: UserRepository + Send + Sync + 'static,
    B: BusinessMemberRepository + Send + Sync + 'static,
    V: TokenVerifier + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    pub user_repo: Arc<U>,
    pub member_repo: Arc<B>,
    pub verifier: Arc<V>,
    pub notifier: Arc<N>,
    pub tokens: Arc<TokenManager>,
    pub mfa: Arc<MfaChallengeStore>,
    pub config: Arc<AuthConfig>,
}

// Arc フィールドのみのため、ジェネリクスに Clone 境界を課さず手動実装
impl<U, B, V, N> Clone for AuthAppState<U, B, V, N>
where
    U: UserRepository + Send + Sync + 'static,
    B: BusinessMemberRepository + Send + Sync + 'static,
    V: TokenVerifier + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            user_repo: self.user_repo.clone(),
            member_repo: self.member_repo.clone(),
            verifier: self.verifier.clone(),
            notifier: self.notifier.clone(),
            tokens: self.tokens.clone(),
            mfa: self.mfa.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Google Login (step 1 for both roles)
// ============================================================================

/// POST /api/auth/google
pub async fn google_login<U, B, V, N>(
    State(state): State<AuthAppState<U, B, V, N>>,
    Json(req): Json<GoogleLoginRequest>,
) -> AuthResult<Json<GoogleLoginResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    B: BusinessMemberRepository + Send + Sync + 'static,
    V: TokenVerifier + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    let role = UserRole::from_str(&req.role)?;

    let use_case = GoogleLoginUseCase::new(
        state.user_repo.clone(),
        state.verifier.clone(),
        state.notifier.clone(),
        state.tokens.clone(),
        state.mfa.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(GoogleLoginInput {
            id_token: req.id_token,
            role,
        })
        .await?;

    let response = match output {
        GoogleLoginOutput::Tokens { pair, user } => GoogleLoginResponse {
            mfa_pending: false,
            session_id: None,
            access_token: Some(pair.access),
            refresh_token: Some(pair.refresh),
            user_id: user.external_id.to_string(),
            role: user.role.to_string(),
        },
        GoogleLoginOutput::MfaPending {
            session_handle,
            user,
        } => GoogleLoginResponse {
            mfa_pending: true,
            session_id: Some(session_handle),
            access_token: None,
            refresh_token: None,
            user_id: user.external_id.to_string(),
            role: user.role.to_string(),
        },
    };

    Ok(Json(response))
}

// ============================================================================
// Business Login (step 2)
// ============================================================================

/// POST /api/auth/business/login
pub async fn business_login<U, B, V, N>(
    State(state): State<AuthAppState<U, B, V, N>>,
    Json(req): Json<BusinessLoginRequest>,
) -> AuthResult<Json<BusinessLoginResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    B: BusinessMemberRepository + Send + Sync + 'static,
    V: TokenVerifier + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    let use_case = BusinessLoginUseCase::new(
        state.user_repo.clone(),
        state.member_repo.clone(),
        state.tokens.clone(),
        state.mfa.clone(),
    );

    let output = use_case
        .execute(BusinessLoginInput {
            email: req.gmail,
            mfa_code: req.mfa_code,
        })
        .await?;

    Ok(Json(BusinessLoginResponse {
        access_token: output.pair.access,
        refresh_token: output.pair.refresh,
        business_id: output.business_id.as_i64(),
    }))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<U, B, V, N>(
    State(state): State<AuthAppState<U, B, V, N>>,
    headers: HeaderMap,
) -> AuthResult<Json<LogoutResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    B: BusinessMemberRepository + Send + Sync + 'static,
    V: TokenVerifier + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    let token = extract_bearer_token(&headers).map_err(|_| AuthError::TokenInvalid)?;

    let use_case = LogoutUseCase::new(state.tokens.clone());
    let output = use_case.execute(token)?;

    Ok(Json(LogoutResponse {
        revoked_token_id: output.revoked_token_id,
    }))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<U, B, V, N>(
    State(state): State<AuthAppState<U, B, V, N>>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<RefreshResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    B: BusinessMemberRepository + Send + Sync + 'static,
    V: TokenVerifier + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    let use_case = RefreshUseCase::new(state.user_repo.clone(), state.tokens.clone());
    let pair = use_case.execute(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token: pair.access,
        refresh_token: pair.refresh,
    }))
}

// ============================================================================
// Current user / Withdrawal (require authentication)
// ============================================================================

/// GET /api/auth/me
pub async fn me(
    axum::Extension(identity): axum::Extension<AuthIdentity>,
) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: identity.external_id,
        gmail: identity.email,
        role: identity.role.to_string(),
    })
}

/// PUT /api/auth/withdrawal
pub async fn withdrawal<U, B, V, N>(
    State(state): State<AuthAppState<U, B, V, N>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    B: BusinessMemberRepository + Send + Sync + 'static,
    V: TokenVerifier + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    let token = extract_bearer_token(&headers).map_err(|_| AuthError::TokenInvalid)?;

    let use_case = WithdrawUseCase::new(state.user_repo.clone(), state.tokens.clone());
    use_case.execute(token).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}
