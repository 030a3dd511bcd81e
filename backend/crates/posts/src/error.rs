//! Post Error Types
//!
//! Post-engine error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Post-specific result type alias
pub type PostResult<T> = Result<T, PostError>;

/// Post-specific error variants
#[derive(Debug, Error)]
pub enum PostError {
    /// Caller must be authenticated for this operation
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated but not the owner
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Field validation failure, carried up from value objects
    #[error(transparent)]
    Validation(AppError),

    /// Transaction conflict persisted through all retries
    #[error("Transaction conflict, retries exhausted")]
    Transient,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PostError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PostError::Unauthorized => ErrorKind::Unauthorized,
            PostError::Forbidden(_) => ErrorKind::Forbidden,
            PostError::NotFound(_) => ErrorKind::NotFound,
            PostError::Validation(err) => err.kind(),
            PostError::Transient | PostError::Database(_) => ErrorKind::OperationFailed,
            PostError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to AppError with an outward-safe message
    pub fn to_app_error(&self) -> AppError {
        match self {
            PostError::Unauthorized => AppError::unauthorized("Authentication failed"),
            PostError::Database(_) => {
                AppError::new(ErrorKind::OperationFailed, "Persistence operation failed")
            }
            PostError::Internal(_) => AppError::internal("Internal error"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            PostError::Database(e) => {
                tracing::error!(error = %e, "Post database error");
            }
            PostError::Internal(msg) => {
                tracing::error!(message = %msg, "Post internal error");
            }
            PostError::Transient => {
                tracing::warn!("Transaction conflict persisted through retries");
            }
            _ => {
                tracing::debug!(error = %self, "Post error");
            }
        }
    }
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for PostError {
    fn from(err: AppError) -> Self {
        PostError::Validation(err)
    }
}
