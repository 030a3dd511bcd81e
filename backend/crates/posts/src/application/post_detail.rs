//! Post Detail Use Case
//!
//! Each read is a view event: the view counter is bumped atomically
//! before the row is loaded. The increment is fire-and-forget; a
//! failure there never turns a successful read into an error.

use std::sync::Arc;

use kernel::id::PostId;

use crate::domain::repository::{PostRecord, PostRepository};
use crate::error::{PostError, PostResult};

/// Post detail use case
pub struct PostDetailUseCase<P>
where
    P: PostRepository,
{
    post_repo: Arc<P>,
}

impl<P> PostDetailUseCase<P>
where
    P: PostRepository,
{
    pub fn new(post_repo: Arc<P>) -> Self {
        Self { post_repo }
    }

    pub async fn execute(&self, post_id: PostId) -> PostResult<PostRecord> {
        // 閲覧数のインクリメント失敗は読み取りを失敗させない
        if let Err(e) = self.post_repo.increment_view_count(post_id).await {
            tracing::warn!(post_id = %post_id, error = %e, "View count increment failed");
        }

        self.post_repo
            .find_detail(post_id)
            .await?
            .ok_or_else(|| PostError::NotFound(format!("Post not found: {post_id}")))
    }
}
