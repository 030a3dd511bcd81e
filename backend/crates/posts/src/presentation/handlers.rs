//! HTTP Handlers
//!
//! Read endpoints are public (anonymous callers allowed); write
//! endpoints require the identity attached by the auth middleware.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use base64::Engine;
use chrono::NaiveDate;
use std::sync::Arc;

use auth::middleware::AuthIdentity;
use kernel::error::app_error::AppError;
use kernel::id::{GenreId, PostId};

use crate::application::{
    AnonymizePostUseCase, CreatePostInput, CreatePostUseCase, DeletePostUseCase, ListGenresUseCase,
    ListPostsUseCase, PostDetailUseCase, ToggleReactionUseCase,
};
use crate::domain::repository::{GenreRepository, PostRepository, ReactionRepository};
use crate::error::{PostError, PostResult};
use crate::presentation::dto::{
    AnonymizeRequest, AnonymizeResponse, CreatePostRequest, CreatePostResponse, DeletePostRequest,
    DetailQuery, GenreQuery, GenreResponse, KeywordQuery, PeriodQuery, PostResponse,
    ReactionStatusQuery, ReactionStatusResponse, ToggleReactionRequest, ToggleReactionResponse,
};

/// Shared state for post handlers
pub struct PostsAppState<P, G, R>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    pub post_repo: Arc<P>,
    pub genre_repo: Arc<G>,
    pub reaction_repo: Arc<R>,
}

// Arc フィールドのみのため、ジェネリクスに Clone 境界を課さず手動実装
impl<P, G, R> Clone for PostsAppState<P, G, R>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            post_repo: self.post_repo.clone(),
            genre_repo: self.genre_repo.clone(),
            reaction_repo: self.reaction_repo.clone(),
        }
    }
}

fn require_identity(identity: Option<axum::Extension<AuthIdentity>>) -> PostResult<AuthIdentity> {
    identity
        .map(|axum::Extension(identity)| identity)
        .ok_or(PostError::Unauthorized)
}

// ============================================================================
// Reads (public)
// ============================================================================

/// GET /api/posts
pub async fn list_posts<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
) -> PostResult<Json<Vec<PostResponse>>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let records = ListPostsUseCase::new(state.post_repo.clone())
        .list_all()
        .await?;
    Ok(Json(records.into_iter().map(PostResponse::from).collect()))
}

/// GET /api/posts/detail?postId=
pub async fn post_detail<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    Query(query): Query<DetailQuery>,
) -> PostResult<Json<PostResponse>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let record = PostDetailUseCase::new(state.post_repo.clone())
        .execute(PostId::from_i64(query.post_id))
        .await?;
    Ok(Json(PostResponse::from(record)))
}

/// GET /api/posts/search?keyword=
pub async fn search_by_keyword<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    Query(query): Query<KeywordQuery>,
) -> PostResult<Json<Vec<PostResponse>>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let records = ListPostsUseCase::new(state.post_repo.clone())
        .by_keyword(&query.keyword)
        .await?;
    Ok(Json(records.into_iter().map(PostResponse::from).collect()))
}

/// GET /api/posts/search/genre?genreId=
pub async fn search_by_genre<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    Query(query): Query<GenreQuery>,
) -> PostResult<Json<Vec<PostResponse>>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let records = ListPostsUseCase::new(state.post_repo.clone())
        .by_genre(GenreId::from_i64(query.genre_id))
        .await?;
    Ok(Json(records.into_iter().map(PostResponse::from).collect()))
}

/// GET /api/posts/search/period?startDate=&endDate= (YYYY-MM-DD)
pub async fn search_by_period<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    Query(query): Query<PeriodQuery>,
) -> PostResult<Json<Vec<PostResponse>>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let start = parse_date(&query.start_date, "startDate")?;
    let end = parse_date(&query.end_date, "endDate")?;

    let records = ListPostsUseCase::new(state.post_repo.clone())
        .by_period(start, end)
        .await?;
    Ok(Json(records.into_iter().map(PostResponse::from).collect()))
}

fn parse_date(value: &str, field: &str) -> PostResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        PostError::Validation(AppError::invalid_input(format!(
            "{field} must be YYYY-MM-DD"
        )))
    })
}

/// GET /api/posts/reaction/status?postId=&userId=
pub async fn reaction_status<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    Query(query): Query<ReactionStatusQuery>,
) -> PostResult<Json<ReactionStatusResponse>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let status = ToggleReactionUseCase::new(state.reaction_repo.clone())
        .status(&query.user_id, PostId::from_i64(query.post_id))
        .await?;

    Ok(Json(ReactionStatusResponse {
        is_reacted: status.reacted,
        num_reaction: status.reaction_count,
    }))
}

/// GET /api/genres
pub async fn list_genres<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
) -> PostResult<Json<Vec<GenreResponse>>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let genres = ListGenresUseCase::new(state.genre_repo.clone())
        .execute()
        .await?;

    Ok(Json(
        genres
            .into_iter()
            .map(|g| GenreResponse {
                genre_id: g.id.as_i64(),
                genre_name: g.name,
            })
            .collect(),
    ))
}

// ============================================================================
// Writes (require the authenticated identity)
// ============================================================================

/// POST /api/posts
pub async fn create_post<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    identity: Option<axum::Extension<AuthIdentity>>,
    Json(req): Json<CreatePostRequest>,
) -> PostResult<impl IntoResponse>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let identity = require_identity(identity)?;

    let image = req
        .post_image
        .map(|encoded| {
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|_| {
                    PostError::Validation(AppError::invalid_input(
                        "postImage must be valid base64",
                    ))
                })
        })
        .transpose()?;

    let use_case = CreatePostUseCase::new(state.post_repo.clone(), state.genre_repo.clone());
    let post_id = use_case
        .execute(CreatePostInput {
            author_external_id: identity.external_id,
            genre_id: GenreId::from_i64(req.genre_id),
            latitude: req.latitude,
            longitude: req.longitude,
            title: req.title,
            body: req.text,
            image,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            post_id: post_id.as_i64(),
        }),
    ))
}

/// DELETE /api/posts
pub async fn delete_post<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    identity: Option<axum::Extension<AuthIdentity>>,
    Json(req): Json<DeletePostRequest>,
) -> PostResult<StatusCode>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let identity = require_identity(identity)?;

    DeletePostUseCase::new(state.post_repo.clone())
        .execute(PostId::from_i64(req.post_id), &identity.external_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/posts/reaction
pub async fn toggle_reaction<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    identity: Option<axum::Extension<AuthIdentity>>,
    Json(req): Json<ToggleReactionRequest>,
) -> PostResult<Json<ToggleReactionResponse>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let identity = require_identity(identity)?;
    let user_id = req.user_id.unwrap_or(identity.external_id);

    let outcome = ToggleReactionUseCase::new(state.reaction_repo.clone())
        .toggle(&user_id, PostId::from_i64(req.post_id))
        .await?;

    Ok(Json(ToggleReactionResponse {
        is_reacted: outcome.reacted,
        num_reaction: outcome.reaction_count,
    }))
}

/// GET /api/posts/history
pub async fn history<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    identity: Option<axum::Extension<AuthIdentity>>,
) -> PostResult<Json<Vec<PostResponse>>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    let identity = require_identity(identity)?;

    let records = ListPostsUseCase::new(state.post_repo.clone())
        .history(&identity.external_id)
        .await?;
    Ok(Json(records.into_iter().map(PostResponse::from).collect()))
}

/// PUT /api/posts/anonymize
pub async fn anonymize_post<P, G, R>(
    State(state): State<PostsAppState<P, G, R>>,
    identity: Option<axum::Extension<AuthIdentity>>,
    Json(req): Json<AnonymizeRequest>,
) -> PostResult<Json<AnonymizeResponse>>
where
    P: PostRepository + Send + Sync + 'static,
    G: GenreRepository + Send + Sync + 'static,
    R: ReactionRepository + Send + Sync + 'static,
{
    require_identity(identity)?;

    AnonymizePostUseCase::new(state.post_repo.clone())
        .execute(PostId::from_i64(req.post_id))
        .await?;

    Ok(Json(AnonymizeResponse {
        post_id: req.post_id,
    }))
}
