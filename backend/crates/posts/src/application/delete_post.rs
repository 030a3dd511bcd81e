//! Delete Post Use Case
//!
//! Only the author may delete. The row is removed for real; dependent
//! report rows cascade through the database foreign key.

use std::sync::Arc;

use kernel::id::PostId;

use crate::domain::repository::PostRepository;
use crate::error::{PostError, PostResult};

/// Delete post use case
pub struct DeletePostUseCase<P>
where
    P: PostRepository,
{
    post_repo: Arc<P>,
}

impl<P> DeletePostUseCase<P>
where
    P: PostRepository,
{
    pub fn new(post_repo: Arc<P>) -> Self {
        Self { post_repo }
    }

    pub async fn execute(&self, post_id: PostId, caller_external_id: &str) -> PostResult<()> {
        let record = self
            .post_repo
            .find_detail(post_id)
            .await?
            .ok_or_else(|| PostError::NotFound(format!("Post not found: {post_id}")))?;

        if record.post.author_external_id != caller_external_id {
            return Err(PostError::Forbidden(
                "Only the author can delete this post".to_string(),
            ));
        }

        self.post_repo.delete(post_id).await?;

        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }
}
