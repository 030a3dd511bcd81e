//! API DTOs (Data Transfer Objects)
//!
//! Wire field names follow the frontend contract (`postId`, `numView`,
//! `text`, ...). Images travel base64-encoded in `postImage`.

use serde::{Deserialize, Serialize};

use crate::domain::entity::place::pin_size_for;
use crate::domain::repository::PostRecord;

/// Request for POST /api/posts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
    pub genre_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Base64-encoded PNG or JPEG
    #[serde(default)]
    pub post_image: Option<String>,
}

/// Response for POST /api/posts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub post_id: i64,
}

/// A post as the frontend sees it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub post_id: i64,
    pub place_id: i64,
    pub genre_id: i64,
    pub user_id: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_image: Option<String>,
    pub num_view: i64,
    pub num_reaction: i64,
    pub post_date: chrono::DateTime<chrono::Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub genre_name: String,
    pub pin_size: f64,
}

impl From<PostRecord> for PostResponse {
    fn from(record: PostRecord) -> Self {
        use base64::Engine;

        let post = record.post;
        Self {
            post_id: post.id.as_i64(),
            place_id: post.place_id.as_i64(),
            genre_id: post.genre_id.as_i64(),
            user_id: post.author_external_id,
            title: post.title.as_str().to_string(),
            text: post.body.as_str().to_string(),
            post_image: post
                .image
                .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes)),
            num_view: post.view_count,
            num_reaction: post.reaction_count,
            post_date: post.created_at,
            latitude: record.latitude,
            longitude: record.longitude,
            genre_name: record.genre_name,
            pin_size: pin_size_for(record.place_post_count),
        }
    }
}

/// Query for GET /api/posts/detail
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailQuery {
    pub post_id: i64,
}

/// Query for GET /api/posts/search
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordQuery {
    pub keyword: String,
}

/// Query for GET /api/posts/search/genre
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreQuery {
    pub genre_id: i64,
}

/// Query for GET /api/posts/search/period (dates as YYYY-MM-DD)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    pub start_date: String,
    pub end_date: String,
}

/// Request for DELETE /api/posts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePostRequest {
    pub post_id: i64,
}

/// Request for POST /api/posts/reaction
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionRequest {
    pub post_id: i64,
    /// Reacting user; defaults to the authenticated caller
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response for POST /api/posts/reaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReactionResponse {
    pub is_reacted: bool,
    pub num_reaction: i64,
}

/// Query for GET /api/posts/reaction/status
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionStatusQuery {
    pub post_id: i64,
    pub user_id: String,
}

/// Response for GET /api/posts/reaction/status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionStatusResponse {
    pub is_reacted: bool,
    pub num_reaction: i64,
}

/// Request for PUT /api/posts/anonymize
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizeRequest {
    pub post_id: i64,
}

/// Response for PUT /api/posts/anonymize
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizeResponse {
    pub post_id: i64,
}

/// A genre as the frontend sees it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreResponse {
    pub genre_id: i64,
    pub genre_name: String,
}
