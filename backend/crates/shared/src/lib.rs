//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Common primitive value objects (ID types, etc.)
//! - Cross-cutting constants
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;

/// 匿名化時にすべての識別フィールドへ上書きされる固定文字列。
///
/// 主キー・外部キーは保持したまま、内容のみを復元不能にします。
pub const ANONYMIZED_SENTINEL: &str = "[Anonymized]";
