//! Posts Router
//!
//! The whole surface sits behind the optional-auth middleware: a
//! missing bearer credential passes through anonymously, but a
//! presented token must verify (a revoked token fails even on reads).
//! Write handlers then require the attached identity.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use auth::middleware::{AuthMiddlewareState, optional_auth};
use auth::token::TokenManager;

use crate::domain::repository::{GenreRepository, PostRepository, ReactionRepository};
use crate::infra::postgres::PgPostRepository;
use crate::presentation::handlers::{self, PostsAppState};

/// Create the posts router with the PostgreSQL repository
pub fn posts_router(repo: PgPostRepository, tokens: Arc<TokenManager>) -> Router {
    let repo = Arc::new(repo);
    let state = PostsAppState {
        post_repo: repo.clone(),
        genre_repo: repo.clone(),
        reaction_repo: repo,
    };
    posts_router_generic(state, tokens)
}

/// Create a generic posts router for any repository implementation
pub fn posts_router_generic<P, G, R>(
    state: PostsAppState<P, G, R>,
    tokens: Arc<TokenManager>,
) -> Router
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let middleware_state = AuthMiddlewareState { tokens };

    Router::new()
        .route(
            "/",
            get(handlers::list_posts::<P, G, R>)
                .post(handlers::create_post::<P, G, R>)
                .delete(handlers::delete_post::<P, G, R>),
        )
        .route("/detail", get(handlers::post_detail::<P, G, R>))
        .route("/search", get(handlers::search_by_keyword::<P, G, R>))
        .route("/search/genre", get(handlers::search_by_genre::<P, G, R>))
        .route(
            "/search/period",
            get(handlers::search_by_period::<P, G, R>),
        )
        .route("/reaction", post(handlers::toggle_reaction::<P, G, R>))
        .route(
            "/reaction/status",
            get(handlers::reaction_status::<P, G, R>),
        )
        .route("/history", get(handlers::history::<P, G, R>))
        .route("/anonymize", put(handlers::anonymize_post::<P, G, R>))
        .layer(middleware::from_fn_with_state(
            middleware_state,
            optional_auth,
        ))
        .with_state(state)
}

/// Create the public genres router with the PostgreSQL repository
pub fn genres_router(repo: PgPostRepository) -> Router {
    let repo = Arc::new(repo);
    let state = PostsAppState {
        post_repo: repo.clone(),
        genre_repo: repo.clone(),
        reaction_repo: repo,
    };
    genres_router_generic(state)
}

/// Create a generic genres router for any repository implementation
pub fn genres_router_generic<P, G, R>(state: PostsAppState<P, G, R>) -> Router
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(handlers::list_genres::<P, G, R>))
        .with_state(state)
}
