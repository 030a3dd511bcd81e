//! Posts Backend Module
//!
//! The post engine and place coalescer behind the `/api/posts*`
//! surface.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Post lifecycle use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Invariants maintained here
//! - A post's reaction count always equals its number of reaction rows
//! - View counts only ever grow; each detail read is one view event
//! - Nearby coordinates (strictly within 0.0001° on both axes)
//!   coalesce into one place whose post count grows once per creation
//! - Anonymization overwrites content in place and never touches keys,
//!   counters, or timestamps

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use error::{PostError, PostResult};
pub use infra::postgres::PgPostRepository;
pub use presentation::router::{
    genres_router, genres_router_generic, posts_router, posts_router_generic,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}
