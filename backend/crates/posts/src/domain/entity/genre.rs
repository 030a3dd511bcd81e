//! Genre Entity

use kernel::id::GenreId;

/// Genre entity
#[derive(Debug, Clone)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}
