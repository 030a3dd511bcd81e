//! Value Objects

pub mod coordinates;
pub mod image;
pub mod post_content;
