//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Login flows and account use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//! - `token` - Bearer token minting, verification, revocation
//! - `mfa` - One-time code challenges for business operators
//!
//! ## Features
//! - Google ID-token sign-in for general users and business operators
//! - Six-digit email MFA challenge for the business login flow
//! - Short-lived access tokens + longer-lived refresh tokens (HS256)
//! - Process-local token revocation with an hourly sweeper
//! - Logical account deletion (withdrawal)
//!
//! ## Security Model
//! - Only the HMAC algorithm family is accepted on bearer tokens
//! - Credential failures collapse into a generic UNAUTHORIZED response
//! - MFA codes expire after 10 minutes and 5 attempts

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod mfa;
pub mod presentation;
pub mod sweeper;
pub mod token;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgIdentityRepository;
pub use mfa::{MfaChallengeStore, MfaConfig};
pub use presentation::middleware::{AuthIdentity, AuthMiddlewareState};
pub use presentation::router::{auth_router, auth_router_generic};
pub use token::{TokenConfig, TokenManager, TokenType};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}
