//! PostgreSQL Repository Implementations
//!
//! Place coalescing runs under SERIALIZABLE isolation with a bounded
//! retry; the reaction toggle relies on the (user, post) unique
//! constraint as the final arbiter and retries once when it fires.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::entity::{genre::Genre, place::Place, post::Post};
use crate::domain::repository::{
    GenreRepository, NewPost, PlaceRepository, PostRecord, PostRepository, ReactionRepository,
    ToggleOutcome,
};
use crate::domain::value_object::coordinates::{COALESCE_THRESHOLD, Coordinates};
use crate::domain::value_object::post_content::{Body, Title};
use crate::error::{PostError, PostResult};
use kernel::ANONYMIZED_SENTINEL;
use kernel::id::{GenreId, PlaceId, PostId};

/// Attempts for transactions that can hit serialization conflicts
const MAX_TX_ATTEMPTS: u32 = 3;

/// PostgreSQL-backed post repository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct PostRecordRow {
    id: i64,
    author_external_id: String,
    place_id: i64,
    genre_id: i64,
    title: String,
    body: String,
    image: Option<Vec<u8>>,
    view_count: i64,
    reaction_count: i64,
    created_at: DateTime<Utc>,
    anonymized_at: Option<DateTime<Utc>>,
    genre_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    place_post_count: Option<i64>,
}

impl PostRecordRow {
    fn into_record(self) -> PostRecord {
        PostRecord {
            post: Post {
                id: PostId::from_i64(self.id),
                author_external_id: self.author_external_id,
                place_id: PlaceId::from_i64(self.place_id),
                genre_id: GenreId::from_i64(self.genre_id),
                title: Title::from_db(self.title),
                body: Body::from_db(self.body),
                image: self.image,
                view_count: self.view_count,
                reaction_count: self.reaction_count,
                created_at: self.created_at,
                anonymized_at: self.anonymized_at,
            },
            genre_name: self.genre_name.unwrap_or_default(),
            latitude: self.latitude.unwrap_or_default(),
            longitude: self.longitude.unwrap_or_default(),
            place_post_count: self.place_post_count.unwrap_or_default(),
        }
    }
}

/// Shared join for every read path: one query, no N+1
const RECORD_SELECT: &str = r#"
    SELECT p.id, p.author_external_id, p.place_id, p.genre_id,
           p.title, p.body, p.image, p.view_count, p.reaction_count,
           p.created_at, p.anonymized_at,
           g.name AS genre_name,
           pl.latitude, pl.longitude, pl.post_count AS place_post_count
    FROM posts p
    LEFT JOIN genres g ON g.id = p.genre_id
    LEFT JOIN places pl ON pl.id = p.place_id
"#;

// ============================================================================
// Error classification
// ============================================================================

fn pg_error_code(err: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|c| c.to_string());
    }
    None
}

fn is_serialization_failure(err: &sqlx::Error) -> bool {
    matches!(pg_error_code(err).as_deref(), Some("40001") | Some("40P01"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(pg_error_code(err).as_deref(), Some("23505"))
}

// ============================================================================
// Place coalescing (shared between create and find_or_create)
// ============================================================================

/// Resolve coordinates to a place id inside the caller's transaction.
///
/// The nearest match by smallest id is row-locked and its post count
/// incremented; otherwise a new place starts at one.
async fn coalesce_place(
    tx: &mut Transaction<'_, Postgres>,
    coordinates: &Coordinates,
) -> Result<PlaceId, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM places
        WHERE ABS(latitude - $1) < $3 AND ABS(longitude - $2) < $3
        ORDER BY id
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(coordinates.latitude())
    .bind(coordinates.longitude())
    .bind(COALESCE_THRESHOLD)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(id) = existing {
        sqlx::query("UPDATE places SET post_count = post_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        return Ok(PlaceId::from_i64(id));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO places (latitude, longitude, post_count) VALUES ($1, $2, 1) RETURNING id",
    )
    .bind(coordinates.latitude())
    .bind(coordinates.longitude())
    .fetch_one(&mut **tx)
    .await?;

    Ok(PlaceId::from_i64(id))
}

// ============================================================================
// Post Repository Implementation
// ============================================================================

impl PgPostRepository {
    async fn try_create(&self, new_post: &NewPost) -> Result<PostId, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let place_id = coalesce_place(&mut tx, &new_post.coordinates).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (
                author_external_id, place_id, genre_id,
                title, body, image,
                view_count, reaction_count, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, 0, 0, NOW())
            RETURNING id
            "#,
        )
        .bind(&new_post.author_external_id)
        .bind(place_id.as_i64())
        .bind(new_post.genre_id.as_i64())
        .bind(new_post.title.as_str())
        .bind(new_post.body.as_str())
        .bind(new_post.image.as_ref().map(|i| i.as_bytes()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(PostId::from_i64(id))
    }

}

fn into_records(rows: Vec<PostRecordRow>) -> Vec<PostRecord> {
    rows.into_iter().map(|r| r.into_record()).collect()
}

impl PostRepository for PgPostRepository {
    async fn create(&self, new_post: NewPost) -> PostResult<PostId> {
        for attempt in 1..=MAX_TX_ATTEMPTS {
            match self.try_create(&new_post).await {
                Ok(id) => return Ok(id),
                Err(e) if is_serialization_failure(&e) && attempt < MAX_TX_ATTEMPTS => {
                    tracing::debug!(attempt, "Place coalescing conflict, retrying");
                }
                Err(e) if is_serialization_failure(&e) => return Err(PostError::Transient),
                Err(e) => return Err(e.into()),
            }
        }
        Err(PostError::Transient)
    }

    async fn find_detail(&self, id: PostId) -> PostResult<Option<PostRecord>> {
        let sql = format!("{RECORD_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRecordRow>(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_record()))
    }

    async fn increment_view_count(&self, id: PostId) -> PostResult<()> {
        let updated = sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(PostError::NotFound(format!("Post not found: {id}")));
        }
        Ok(())
    }

    async fn list_all(&self) -> PostResult<Vec<PostRecord>> {
        let sql = format!("{RECORD_SELECT} ORDER BY p.created_at DESC");
        let rows = sqlx::query_as::<_, PostRecordRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(into_records(rows))
    }

    async fn search_by_keyword(&self, keyword: &str) -> PostResult<Vec<PostRecord>> {
        let sql = format!(
            "{RECORD_SELECT} WHERE p.title LIKE $1 OR p.body LIKE $1 ORDER BY p.created_at DESC"
        );
        let rows = sqlx::query_as::<_, PostRecordRow>(&sql)
            .bind(format!("%{keyword}%"))
            .fetch_all(&self.pool)
            .await?;
        Ok(into_records(rows))
    }

    async fn search_by_genre(&self, genre_id: GenreId) -> PostResult<Vec<PostRecord>> {
        let sql = format!("{RECORD_SELECT} WHERE p.genre_id = $1 ORDER BY p.created_at DESC");
        let rows = sqlx::query_as::<_, PostRecordRow>(&sql)
            .bind(genre_id.as_i64())
            .fetch_all(&self.pool)
            .await?;
        Ok(into_records(rows))
    }

    async fn search_by_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PostResult<Vec<PostRecord>> {
        let sql = format!(
            "{RECORD_SELECT} WHERE p.created_at >= $1 AND p.created_at < $2 ORDER BY p.created_at DESC"
        );
        let rows = sqlx::query_as::<_, PostRecordRow>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(into_records(rows))
    }

    async fn history(&self, author_external_id: &str) -> PostResult<Vec<PostRecord>> {
        let sql =
            format!("{RECORD_SELECT} WHERE p.author_external_id = $1 ORDER BY p.created_at DESC");
        let rows = sqlx::query_as::<_, PostRecordRow>(&sql)
            .bind(author_external_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(into_records(rows))
    }

    async fn delete(&self, id: PostId) -> PostResult<()> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(PostError::NotFound(format!("Post not found: {id}")));
        }
        Ok(())
    }

    async fn anonymize(&self, id: PostId) -> PostResult<()> {
        // COALESCE keeps the first anonymization timestamp, making the
        // overwrite idempotent; counters and references are untouched
        let updated = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2,
                body = $2,
                anonymized_at = COALESCE(anonymized_at, NOW())
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(ANONYMIZED_SENTINEL)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(PostError::NotFound(format!("Post not found: {id}")));
        }
        Ok(())
    }
}

// ============================================================================
// Place Repository Implementation
// ============================================================================

impl PlaceRepository for PgPostRepository {
    async fn find_or_create(&self, coordinates: &Coordinates) -> PostResult<PlaceId> {
        for attempt in 1..=MAX_TX_ATTEMPTS {
            let result: Result<PlaceId, sqlx::Error> = async {
                let mut tx = self.pool.begin().await?;
                sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
                    .execute(&mut *tx)
                    .await?;
                let place_id = coalesce_place(&mut tx, coordinates).await?;
                tx.commit().await?;
                Ok(place_id)
            }
            .await;

            match result {
                Ok(id) => return Ok(id),
                Err(e) if is_serialization_failure(&e) && attempt < MAX_TX_ATTEMPTS => {
                    tracing::debug!(attempt, "Place coalescing conflict, retrying");
                }
                Err(e) if is_serialization_failure(&e) => return Err(PostError::Transient),
                Err(e) => return Err(e.into()),
            }
        }
        Err(PostError::Transient)
    }

    async fn get(&self, id: PlaceId) -> PostResult<Option<Place>> {
        let row: Option<(i64, f64, f64, i64)> = sqlx::query_as(
            "SELECT id, latitude, longitude, post_count FROM places WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, latitude, longitude, post_count)| Place {
            id: PlaceId::from_i64(id),
            latitude,
            longitude,
            post_count,
        }))
    }
}

// ============================================================================
// Genre Repository Implementation
// ============================================================================

impl GenreRepository for PgPostRepository {
    async fn exists(&self, id: GenreId) -> PostResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM genres WHERE id = $1)")
            .bind(id.as_i64())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list(&self) -> PostResult<Vec<Genre>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM genres ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Genre {
                id: GenreId::from_i64(id),
                name,
            })
            .collect())
    }
}

// ============================================================================
// Reaction Repository Implementation
// ============================================================================

impl PgPostRepository {
    async fn try_toggle(
        &self,
        user_external_id: &str,
        post_id: PostId,
    ) -> Result<Option<ToggleOutcome>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Row-lock the post first; this serializes the counter update
        // with concurrent toggles on the same post
        let current: Option<i64> =
            sqlx::query_scalar("SELECT reaction_count FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id.as_i64())
                .fetch_optional(&mut *tx)
                .await?;

        let Some(_) = current else {
            return Ok(None);
        };

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reactions WHERE user_external_id = $1 AND post_id = $2)",
        )
        .bind(user_external_id)
        .bind(post_id.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        let reacted = if exists {
            sqlx::query("DELETE FROM reactions WHERE user_external_id = $1 AND post_id = $2")
                .bind(user_external_id)
                .bind(post_id.as_i64())
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE posts SET reaction_count = reaction_count - 1 WHERE id = $1")
                .bind(post_id.as_i64())
                .execute(&mut *tx)
                .await?;
            false
        } else {
            sqlx::query(
                "INSERT INTO reactions (user_external_id, post_id, created_at) VALUES ($1, $2, NOW())",
            )
            .bind(user_external_id)
            .bind(post_id.as_i64())
            .execute(&mut *tx)
            .await?;
            sqlx::query("UPDATE posts SET reaction_count = reaction_count + 1 WHERE id = $1")
                .bind(post_id.as_i64())
                .execute(&mut *tx)
                .await?;
            true
        };

        let reaction_count: i64 =
            sqlx::query_scalar("SELECT reaction_count FROM posts WHERE id = $1")
                .bind(post_id.as_i64())
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(Some(ToggleOutcome {
            reacted,
            reaction_count,
        }))
    }
}

impl ReactionRepository for PgPostRepository {
    async fn toggle(&self, user_external_id: &str, post_id: PostId) -> PostResult<ToggleOutcome> {
        let outcome = match self.try_toggle(user_external_id, post_id).await {
            Err(e) if is_unique_violation(&e) => {
                // Lost the insert race: the row exists now, so a second
                // pass takes the delete branch
                tracing::debug!(post_id = %post_id, "Reaction unique conflict, retrying once");
                self.try_toggle(user_external_id, post_id).await?
            }
            other => other?,
        };

        outcome.ok_or_else(|| PostError::NotFound(format!("Post not found: {post_id}")))
    }

    async fn is_reacted(&self, user_external_id: &str, post_id: PostId) -> PostResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reactions WHERE user_external_id = $1 AND post_id = $2)",
        )
        .bind(user_external_id)
        .bind(post_id.as_i64())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn reaction_count(&self, post_id: PostId) -> PostResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT reaction_count FROM posts WHERE id = $1")
                .bind(post_id.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        count.ok_or_else(|| PostError::NotFound(format!("Post not found: {post_id}")))
    }
}
