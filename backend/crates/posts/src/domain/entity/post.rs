//! Post Entity
//!
//! User-visible content anchored at a place. Two terminal states exist:
//! anonymized (content overwritten in place) and deleted (row removed).
//! Neither transition can be reversed.

use chrono::{DateTime, Utc};
use kernel::ANONYMIZED_SENTINEL;
use kernel::id::{GenreId, PlaceId, PostId};

use crate::domain::value_object::post_content::{Body, Title};

/// Post entity
#[derive(Debug, Clone)]
pub struct Post {
    /// Numeric identifier (primary key)
    pub id: PostId,
    /// Author's user external id
    pub author_external_id: String,
    /// Anchoring place
    pub place_id: PlaceId,
    /// Genre
    pub genre_id: GenreId,
    /// Title (1-50 characters)
    pub title: Title,
    /// Body text (1-2000 characters)
    pub body: Body,
    /// Inline image bytes, if any
    pub image: Option<Vec<u8>>,
    /// View counter, monotone non-decreasing
    pub view_count: i64,
    /// Reaction counter, always equal to the number of reaction rows
    pub reaction_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Anonymization timestamp
    pub anonymized_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_anonymized(&self) -> bool {
        self.anonymized_at.is_some()
    }

    /// Overwrite title and body with the sentinel, keeping counters,
    /// references, and timestamps. Idempotent.
    pub fn anonymize(&mut self) {
        if self.is_anonymized() {
            return;
        }
        self.title = Title::from_db(ANONYMIZED_SENTINEL);
        self.body = Body::from_db(ANONYMIZED_SENTINEL);
        self.anonymized_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post {
            id: PostId::from_i64(1),
            author_external_id: "sub-1".to_string(),
            place_id: PlaceId::from_i64(10),
            genre_id: GenreId::from_i64(2),
            title: Title::new("かき氷はじめました").unwrap(),
            body: Body::new("夏季限定でいちご味あります").unwrap(),
            image: None,
            view_count: 12,
            reaction_count: 3,
            created_at: Utc::now(),
            anonymized_at: None,
        }
    }

    #[test]
    fn test_anonymize_overwrites_content_only() {
        let mut p = post();
        let id = p.id;
        let author = p.author_external_id.clone();
        p.anonymize();

        assert_eq!(p.title.as_str(), ANONYMIZED_SENTINEL);
        assert_eq!(p.body.as_str(), ANONYMIZED_SENTINEL);
        assert!(p.is_anonymized());
        // Counters and references survive
        assert_eq!(p.id, id);
        assert_eq!(p.author_external_id, author);
        assert_eq!(p.view_count, 12);
        assert_eq!(p.reaction_count, 3);
    }

    #[test]
    fn test_anonymize_is_idempotent() {
        let mut p = post();
        p.anonymize();
        let stamp = p.anonymized_at;
        p.anonymize();
        assert_eq!(p.anonymized_at, stamp);
    }
}
