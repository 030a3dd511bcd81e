//! Business Profile Value Objects
//!
//! Field validations for mutable business-member profile data.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Display name length bounds (counted in Unicode scalar values)
const NAME_MIN_CHARS: usize = 1;
const NAME_MAX_CHARS: usize = 50;

/// Business display name (1-50 characters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessName(String);

impl BusinessName {
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let name = name.into();
        let chars = name.chars().count();

        if chars < NAME_MIN_CHARS {
            return Err(AppError::validation_failed("Business name cannot be empty"));
        }

        if chars > NAME_MAX_CHARS {
            return Err(AppError::validation_failed(format!(
                "Business name must be at most {} characters",
                NAME_MAX_CHARS
            )));
        }

        Ok(Self(name))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BusinessName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phone number: digits with optional separators, non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(phone: impl Into<String>) -> AppResult<Self> {
        let phone = phone.into();

        if phone.is_empty() {
            return Err(AppError::validation_failed("Phone number cannot be empty"));
        }

        let valid = phone
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-' || c == '+');
        if !valid || !phone.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation_failed("Invalid phone number format"));
        }

        Ok(Self(phone))
    }

    pub fn from_db(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
