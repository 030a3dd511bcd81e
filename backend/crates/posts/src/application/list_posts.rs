//! List / Search Use Cases
//!
//! All listings come back newest first from a single join query; the
//! period search maps calendar dates onto a half-open timestamp
//! interval.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use kernel::id::GenreId;

use crate::domain::repository::{PostRecord, PostRepository};
use crate::error::{PostError, PostResult};

/// List / search use case
pub struct ListPostsUseCase<P>
where
    P: PostRepository,
{
    post_repo: Arc<P>,
}

impl<P> ListPostsUseCase<P>
where
    P: PostRepository,
{
    pub fn new(post_repo: Arc<P>) -> Self {
        Self { post_repo }
    }

    pub async fn list_all(&self) -> PostResult<Vec<PostRecord>> {
        self.post_repo.list_all().await
    }

    pub async fn by_keyword(&self, keyword: &str) -> PostResult<Vec<PostRecord>> {
        if keyword.is_empty() {
            return Err(PostError::Validation(
                kernel::error::app_error::AppError::invalid_input("keyword is required"),
            ));
        }
        self.post_repo.search_by_keyword(keyword).await
    }

    pub async fn by_genre(&self, genre_id: GenreId) -> PostResult<Vec<PostRecord>> {
        self.post_repo.search_by_genre(genre_id).await
    }

    /// Period search over `[start, end]` calendar dates.
    ///
    /// The end date is included by translating it to the exclusive
    /// upper bound of the following midnight, so the underlying
    /// interval stays half-open.
    pub async fn by_period(&self, start: NaiveDate, end: NaiveDate) -> PostResult<Vec<PostRecord>> {
        if end < start {
            return Err(PostError::Validation(
                kernel::error::app_error::AppError::invalid_input(
                    "endDate must not precede startDate",
                ),
            ));
        }

        let start_at = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).expect("valid midnight"));
        let end_exclusive = end.succ_opt().ok_or_else(|| {
            PostError::Validation(kernel::error::app_error::AppError::invalid_input(
                "endDate out of range",
            ))
        })?;
        let end_at =
            Utc.from_utc_datetime(&end_exclusive.and_hms_opt(0, 0, 0).expect("valid midnight"));

        self.post_repo.search_by_period(start_at, end_at).await
    }

    pub async fn history(&self, author_external_id: &str) -> PostResult<Vec<PostRecord>> {
        self.post_repo.history(author_external_id).await
    }
}
