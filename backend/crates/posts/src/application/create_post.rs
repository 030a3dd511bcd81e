//! Create Post Use Case
//!
//! Validates content, image, and genre, then hands the insert (place
//! coalescing included) to the repository as a single transaction.

use std::sync::Arc;

use kernel::id::{GenreId, PostId};

use crate::domain::repository::{GenreRepository, NewPost, PostRepository};
use crate::domain::value_object::{
    coordinates::Coordinates,
    image::PostImage,
    post_content::{Body, Title},
};
use crate::error::{PostError, PostResult};

/// Create post input
pub struct CreatePostInput {
    pub author_external_id: String,
    pub genre_id: GenreId,
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub body: String,
    pub image: Option<Vec<u8>>,
}

/// Create post use case
pub struct CreatePostUseCase<P, G>
where
    P: PostRepository,
    G: GenreRepository,
{
    post_repo: Arc<P>,
    genre_repo: Arc<G>,
}

impl<P, G> CreatePostUseCase<P, G>
where
    P: PostRepository,
    G: GenreRepository,
{
    pub fn new(post_repo: Arc<P>, genre_repo: Arc<G>) -> Self {
        Self {
            post_repo,
            genre_repo,
        }
    }

    pub async fn execute(&self, input: CreatePostInput) -> PostResult<PostId> {
        // Validation order: title, body, image, genre
        let title = Title::new(input.title)?;
        let body = Body::new(input.body)?;
        let image = input.image.map(PostImage::new).transpose()?;
        let coordinates = Coordinates::new(input.latitude, input.longitude)?;

        if !self.genre_repo.exists(input.genre_id).await? {
            return Err(PostError::Validation(
                kernel::error::app_error::AppError::validation_failed("Unknown genre"),
            ));
        }

        let post_id = self
            .post_repo
            .create(NewPost {
                author_external_id: input.author_external_id.clone(),
                genre_id: input.genre_id,
                coordinates,
                title,
                body,
                image,
            })
            .await?;

        tracing::info!(
            post_id = %post_id,
            author = %input.author_external_id,
            "Post created"
        );
        Ok(post_id)
    }
}
