//! Reaction Entity
//!
//! A record witnessing that a user has reacted to a post. The
//! (user, post) pair is unique; the database constraint is the ultimate
//! arbiter of the at-most-one invariant.

use chrono::{DateTime, Utc};
use kernel::id::PostId;

/// Reaction entity
#[derive(Debug, Clone)]
pub struct Reaction {
    pub user_external_id: String,
    pub post_id: PostId,
    pub created_at: DateTime<Utc>,
}
