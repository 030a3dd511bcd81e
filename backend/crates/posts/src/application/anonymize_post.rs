//! Anonymize Post Use Case
//!
//! Irreversibly overwrites the post's content with the sentinel while
//! keeping its keys, counters, and timestamps intact.

use std::sync::Arc;

use kernel::id::PostId;

use crate::domain::repository::PostRepository;
use crate::error::PostResult;

/// Anonymize post use case
pub struct AnonymizePostUseCase<P>
where
    P: PostRepository,
{
    post_repo: Arc<P>,
}

impl<P> AnonymizePostUseCase<P>
where
    P: PostRepository,
{
    pub fn new(post_repo: Arc<P>) -> Self {
        Self { post_repo }
    }

    pub async fn execute(&self, post_id: PostId) -> PostResult<()> {
        self.post_repo.anonymize(post_id).await?;
        tracing::info!(post_id = %post_id, "Post anonymized");
        Ok(())
    }
}
