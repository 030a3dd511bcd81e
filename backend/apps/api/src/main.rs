//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::{AuthConfig, MfaChallengeStore, MfaConfig, PgIdentityRepository, TokenConfig, TokenManager};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http,
    http::{Method, header},
};
use posts::PgPostRepository;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 5 MiB image + base64 overhead + JSON envelope
const BODY_LIMIT_BYTES: usize = 8 * 1024 * 1024;

fn is_production() -> bool {
    // APP_ENV preferred; GO_ENV kept for deployment compatibility
    let environment = env::var("APP_ENV")
        .or_else(|_| env::var("GO_ENV"))
        .unwrap_or_default();
    environment == "production"
}

fn token_config() -> anyhow::Result<TokenConfig> {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => Ok(TokenConfig::new(secret.into_bytes())),
        _ if is_production() => {
            anyhow::bail!("JWT_SECRET must be set in production")
        }
        _ => {
            tracing::warn!("JWT_SECRET not set, using a random per-process secret (dev only)");
            Ok(TokenConfig::development())
        }
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    match env::var("GOOGLE_CLIENT_ID") {
        Ok(client_id) if !client_id.is_empty() => Ok(AuthConfig::new(client_id)),
        _ if is_production() => {
            anyhow::bail!("GOOGLE_CLIENT_ID must be set in production")
        }
        _ => Ok(AuthConfig::development()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,posts=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations").run(&pool).await?;

    tracing::info!("Migrations completed");

    // Process-local auth state + background sweepers
    let tokens = Arc::new(TokenManager::new(token_config()?));
    let mfa = Arc::new(MfaChallengeStore::new(MfaConfig::default()));
    let revocation_sweeper = tokens.spawn_sweeper();
    let mfa_sweeper = mfa.spawn_sweeper();

    // Repositories
    let identity_repo = PgIdentityRepository::new(pool.clone());
    let post_repo = PgPostRepository::new(pool.clone());

    // CORS configuration
    let allowed_origins = env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth::auth_router(identity_repo, tokens.clone(), mfa.clone(), auth_config()?),
        )
        .nest(
            "/api/posts",
            posts::posts_router(post_repo.clone(), tokens.clone()),
        )
        .nest("/api/genres", posts::genres_router(post_repo))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Stop is idempotent; nothing depends on sweep completion here
    revocation_sweeper.stop();
    mfa_sweeper.stop();

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
