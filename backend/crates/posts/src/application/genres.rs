//! Genre Listing Use Case

use std::sync::Arc;

use crate::domain::entity::genre::Genre;
use crate::domain::repository::GenreRepository;
use crate::error::PostResult;

/// Genre listing use case
pub struct ListGenresUseCase<G>
where
    G: GenreRepository,
{
    genre_repo: Arc<G>,
}

impl<G> ListGenresUseCase<G>
where
    G: GenreRepository,
{
    pub fn new(genre_repo: Arc<G>) -> Self {
        Self { genre_repo }
    }

    pub async fn execute(&self) -> PostResult<Vec<Genre>> {
        self.genre_repo.list().await
    }
}
