//! External ID Value Object
//!
//! The opaque subject string supplied by the upstream OAuth provider.
//! It is the user's primary key; we never interpret its contents.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on stored identifier length (well above Google's ~21 digits)
const EXTERNAL_ID_MAX_LENGTH: usize = 255;

/// Opaque external identifier (OAuth subject)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId(String);

impl ExternalId {
    /// Create a new external id with validation
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(AppError::invalid_input("External id cannot be empty"));
        }

        if value.len() > EXTERNAL_ID_MAX_LENGTH {
            return Err(AppError::invalid_input(format!(
                "External id must be at most {} bytes",
                EXTERNAL_ID_MAX_LENGTH
            )));
        }

        Ok(Self(value))
    }

    /// Create from a database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to string for database storage
    pub fn into_db(self) -> String {
        self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ExternalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
