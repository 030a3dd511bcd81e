//! Repository Traits
//!
//! Interfaces for post, place, genre, and reaction persistence.
//! Implementation is in the infrastructure layer; tests use in-memory
//! fakes.

use chrono::{DateTime, Utc};
use kernel::id::{GenreId, PlaceId, PostId};

use crate::domain::entity::{genre::Genre, place::Place, post::Post};
use crate::domain::value_object::{
    coordinates::Coordinates,
    image::PostImage,
    post_content::{Body, Title},
};
use crate::error::PostResult;

/// Input for post creation
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_external_id: String,
    pub genre_id: GenreId,
    pub coordinates: Coordinates,
    pub title: Title,
    pub body: Body,
    pub image: Option<PostImage>,
}

/// A post joined with its genre and place for response composition
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub post: Post,
    pub genre_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Lifetime post count of the anchoring place (drives pin sizing)
    pub place_post_count: i64,
}

/// Result of a reaction toggle
#[derive(Debug, Clone, Copy)]
pub struct ToggleOutcome {
    /// Whether the reaction exists after the toggle
    pub reacted: bool,
    /// Post reaction count after the toggle
    pub reaction_count: i64,
}

/// Post repository trait
#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    /// Create a post inside one transaction: coalesce the place
    /// (incrementing its post count) and insert the row with zeroed
    /// counters.
    async fn create(&self, new_post: NewPost) -> PostResult<PostId>;

    /// Load a post with its genre and place
    async fn find_detail(&self, id: PostId) -> PostResult<Option<PostRecord>>;

    /// Atomically bump the view counter by one
    async fn increment_view_count(&self, id: PostId) -> PostResult<()>;

    /// All posts, newest first, as one join query
    async fn list_all(&self) -> PostResult<Vec<PostRecord>>;

    /// Substring match on title or body, newest first
    async fn search_by_keyword(&self, keyword: &str) -> PostResult<Vec<PostRecord>>;

    /// Exact genre match, newest first
    async fn search_by_genre(&self, genre_id: GenreId) -> PostResult<Vec<PostRecord>>;

    /// Half-open interval on creation time `[start, end)`, newest first
    async fn search_by_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PostResult<Vec<PostRecord>>;

    /// Posts authored by the given user, newest first
    async fn history(&self, author_external_id: &str) -> PostResult<Vec<PostRecord>>;

    /// Remove the post row; reports cascade via foreign keys
    async fn delete(&self, id: PostId) -> PostResult<()>;

    /// Overwrite title and body with the sentinel and stamp
    /// `anonymized_at`. Counters and references survive. Idempotent.
    async fn anonymize(&self, id: PostId) -> PostResult<()>;
}

/// Place repository trait
#[trait_variant::make(PlaceRepository: Send)]
pub trait LocalPlaceRepository {
    /// Map coordinates to a stable place id.
    ///
    /// Matches an existing place when both axis deltas are strictly
    /// below the coalescing threshold (ties resolve to the smallest id)
    /// and increments its post count; otherwise inserts a new place
    /// with a count of one.
    async fn find_or_create(&self, coordinates: &Coordinates) -> PostResult<PlaceId>;

    /// Load a place
    async fn get(&self, id: PlaceId) -> PostResult<Option<Place>>;
}

/// Genre repository trait
#[trait_variant::make(GenreRepository: Send)]
pub trait LocalGenreRepository {
    /// Whether the genre id exists
    async fn exists(&self, id: GenreId) -> PostResult<bool>;

    /// All genres, stable order
    async fn list(&self) -> PostResult<Vec<Genre>>;
}

/// Reaction repository trait
#[trait_variant::make(ReactionRepository: Send)]
pub trait LocalReactionRepository {
    /// Toggle the (user, post) reaction inside one transaction,
    /// adjusting the post's reaction count by ±1. A unique-constraint
    /// race is retried once; the pair state afterwards decides the
    /// outcome.
    async fn toggle(&self, user_external_id: &str, post_id: PostId) -> PostResult<ToggleOutcome>;

    /// Pure read: does a reaction row exist for the pair?
    async fn is_reacted(&self, user_external_id: &str, post_id: PostId) -> PostResult<bool>;

    /// Current reaction count of the post
    async fn reaction_count(&self, post_id: PostId) -> PostResult<i64>;
}
