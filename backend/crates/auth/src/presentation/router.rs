//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use platform::google::{GoogleTokenVerifier, TokenVerifier};
use platform::notify::{LogNotificationSender, NotificationSender};

use crate::application::config::AuthConfig;
use crate::domain::repository::{BusinessMemberRepository, UserRepository};
use crate::infra::postgres::PgIdentityRepository;
use crate::mfa::MfaChallengeStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_auth};
use crate::token::TokenManager;

/// Create the Auth router with PostgreSQL repository and the live
/// Google verifier
pub fn auth_router(
    repo: PgIdentityRepository,
    tokens: Arc<TokenManager>,
    mfa: Arc<MfaChallengeStore>,
    config: AuthConfig,
) -> Router {
    let repo = Arc::new(repo);
    let verifier = Arc::new(GoogleTokenVerifier::new(config.google_client_id.clone()));
    let state = AuthAppState {
        user_repo: repo.clone(),
        member_repo: repo,
        verifier,
        notifier: Arc::new(LogNotificationSender),
        tokens,
        mfa,
        config: Arc::new(config),
    };

    auth_router_generic(state)
}

/// Create a generic Auth router for any repository / verifier / sender
pub fn auth_router_generic<U, B, V, N>(state: AuthAppState<U, B, V, N>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    B: BusinessMemberRepository + Send + Sync + 'static,
    V: TokenVerifier + Send + Sync + 'static,
    N: NotificationSender + Send + Sync + 'static,
{
    let middleware_state = AuthMiddlewareState {
        tokens: state.tokens.clone(),
    };

    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route("/withdrawal", put(handlers::withdrawal::<U, B, V, N>))
        .route_layer(middleware::from_fn_with_state(
            middleware_state,
            require_auth,
        ));

    Router::new()
        .route("/google", post(handlers::google_login::<U, B, V, N>))
        .route(
            "/business/login",
            post(handlers::business_login::<U, B, V, N>),
        )
        .route("/logout", post(handlers::logout::<U, B, V, N>))
        .route("/refresh", post(handlers::refresh::<U, B, V, N>))
        .merge(protected)
        .with_state(state)
}
