//! Common ID Types
//!
//! Type-safe ID wrappers for domain entities.
//!
//! データベースの数値主キー（BIGINT）をエンティティごとに型付けします。
//! `PostId` を `PlaceId` の引数に渡すようなミスをコンパイル時に防ぎます。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type PostId = Id<markers::Post>;
/// let id = PostId::from_i64(42);
/// assert_eq!(id.as_i64(), 42);
/// ```
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T> {
    value: i64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Create from a database value
    pub const fn from_i64(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Get the raw database value
    pub const fn as_i64(&self) -> i64 {
        self.value
    }
}

// PhantomData のせいで derive が T: Trait 境界を要求するため手動実装
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

/// Marker types for entity IDs
pub mod markers {
    /// Post entity marker
    pub struct Post;
    /// Place entity marker
    pub struct Place;
    /// Genre entity marker
    pub struct Genre;
    /// BusinessMember entity marker
    pub struct BusinessMember;
}

/// Post ID
pub type PostId = Id<markers::Post>;
/// Place ID
pub type PlaceId = Id<markers::Place>;
/// Genre ID
pub type GenreId = Id<markers::Genre>;
/// BusinessMember ID
pub type BusinessMemberId = Id<markers::BusinessMember>;
