//! Post Content Value Objects
//!
//! Title and body with their length rules, counted in Unicode scalar
//! values so multibyte text counts the same as ASCII.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Title length bounds
pub const TITLE_MAX_CHARS: usize = 50;
/// Body length bounds
pub const BODY_MAX_CHARS: usize = 2000;

/// Post title (1-50 characters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title(String);

impl Title {
    pub fn new(title: impl Into<String>) -> AppResult<Self> {
        let title = title.into();
        let chars = title.chars().count();

        if chars == 0 {
            return Err(AppError::validation_failed("Title cannot be empty"));
        }
        if chars > TITLE_MAX_CHARS {
            return Err(AppError::validation_failed(format!(
                "Title must be at most {} characters",
                TITLE_MAX_CHARS
            )));
        }

        Ok(Self(title))
    }

    pub fn from_db(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Post body (1-2000 characters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body(String);

impl Body {
    pub fn new(body: impl Into<String>) -> AppResult<Self> {
        let body = body.into();
        let chars = body.chars().count();

        if chars == 0 {
            return Err(AppError::validation_failed("Body cannot be empty"));
        }
        if chars > BODY_MAX_CHARS {
            return Err(AppError::validation_failed(format!(
                "Body must be at most {} characters",
                BODY_MAX_CHARS
            )));
        }

        Ok(Self(body))
    }

    pub fn from_db(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
