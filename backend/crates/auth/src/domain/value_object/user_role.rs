//! User Role Value Object

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role
///
/// Stored as a lowercase string in the database and in token claims.
/// Admin accounts are created out-of-band; Google login only ever claims
/// `general` or `business`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// 一般ユーザー
    General,
    /// 事業者メンバー
    Business,
    /// 管理者
    Admin,
}

impl UserRole {
    /// Wire / database representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::General => "general",
            UserRole::Business => "business",
            UserRole::Admin => "admin",
        }
    }

    /// Whether this role may be claimed on the Google login endpoint
    pub const fn is_claimable(&self) -> bool {
        matches!(self, UserRole::General | UserRole::Business)
    }

    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub const fn is_business(&self) -> bool {
        matches!(self, UserRole::Business)
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "general" => Ok(UserRole::General),
            "business" => Ok(UserRole::Business),
            "admin" => Ok(UserRole::Admin),
            other => Err(AppError::invalid_input(format!(
                "Unknown role: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
