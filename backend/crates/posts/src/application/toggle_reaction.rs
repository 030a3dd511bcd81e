//! Reaction Use Cases
//!
//! A toggle flips the existence of the (user, post) reaction row and
//! moves the post counter with it, all inside one transaction. The
//! status query is a pure read.

use std::sync::Arc;

use kernel::id::PostId;

use crate::domain::repository::{ReactionRepository, ToggleOutcome};
use crate::error::PostResult;

/// Reaction use case
pub struct ToggleReactionUseCase<R>
where
    R: ReactionRepository,
{
    reaction_repo: Arc<R>,
}

/// Reaction status for the (user, post) pair
#[derive(Debug, Clone, Copy)]
pub struct ReactionStatus {
    pub reacted: bool,
    pub reaction_count: i64,
}

impl<R> ToggleReactionUseCase<R>
where
    R: ReactionRepository,
{
    pub fn new(reaction_repo: Arc<R>) -> Self {
        Self { reaction_repo }
    }

    pub async fn toggle(
        &self,
        user_external_id: &str,
        post_id: PostId,
    ) -> PostResult<ToggleOutcome> {
        let outcome = self.reaction_repo.toggle(user_external_id, post_id).await?;

        tracing::debug!(
            post_id = %post_id,
            user = %user_external_id,
            reacted = outcome.reacted,
            "Reaction toggled"
        );
        Ok(outcome)
    }

    pub async fn status(
        &self,
        user_external_id: &str,
        post_id: PostId,
    ) -> PostResult<ReactionStatus> {
        let reacted = self
            .reaction_repo
            .is_reacted(user_external_id, post_id)
            .await?;
        let reaction_count = self.reaction_repo.reaction_count(post_id).await?;
        Ok(ReactionStatus {
            reacted,
            reaction_count,
        })
    }
}
