//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Credential failures deliberately
//! collapse into a generic UNAUTHORIZED at the boundary; the detail
//! lives only in logs.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::google::GoogleVerifyError;
use platform::notify::NotifyError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Google ID-token verification failed
    #[error("Google token verification failed: {0}")]
    GoogleVerification(#[from] GoogleVerifyError),

    /// Bearer token failed verification (signature, expiry, algorithm)
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// Token is present in the revocation set
    #[error("Token has been revoked")]
    TokenRevoked,

    /// Token type does not match the expected type
    #[error("Token type mismatch")]
    TokenTypeMismatch,

    /// No MFA challenge exists for the email
    #[error("No MFA challenge found")]
    MfaChallengeNotFound,

    /// MFA challenge has expired
    #[error("MFA code expired")]
    MfaExpired,

    /// Wrong MFA code (challenge retained for retry)
    #[error("Invalid MFA code")]
    MfaInvalidCode,

    /// MFA attempts exhausted (challenge discarded)
    #[error("MFA attempts exhausted")]
    MfaRateLimited,

    /// Account has been withdrawn (logically deleted)
    #[error("Account has been withdrawn")]
    AccountWithdrawn,

    /// External id exists under a different email
    #[error("Account already registered with a different email")]
    EmailConflict,

    /// Caller is not a business member
    #[error("User is not a business member")]
    NotBusinessMember,

    /// Admin accounts cannot be withdrawn
    #[error("Admin accounts cannot be deleted")]
    AdminUndeletable,

    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Field validation failure, carried up from value objects
    #[error(transparent)]
    Validation(AppError),

    /// Notification delivery failed
    #[error("Notification delivery failed: {0}")]
    Notification(#[from] NotifyError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::GoogleVerification(_)
            | AuthError::TokenInvalid
            | AuthError::TokenRevoked
            | AuthError::TokenTypeMismatch
            | AuthError::MfaChallengeNotFound
            | AuthError::MfaExpired
            | AuthError::MfaInvalidCode
            | AuthError::AccountWithdrawn => ErrorKind::Unauthorized,
            AuthError::MfaRateLimited => ErrorKind::RateLimited,
            AuthError::EmailConflict => ErrorKind::Duplicate,
            AuthError::NotBusinessMember | AuthError::AdminUndeletable => ErrorKind::Forbidden,
            AuthError::NotFound(_) => ErrorKind::NotFound,
            AuthError::Validation(err) => err.kind(),
            AuthError::Notification(_) | AuthError::Database(_) => ErrorKind::OperationFailed,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to AppError with an outward-safe message
    ///
    /// Credential failures share one generic message so that callers
    /// cannot probe which step rejected them.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::GoogleVerification(_)
            | AuthError::TokenInvalid
            | AuthError::TokenRevoked
            | AuthError::TokenTypeMismatch
            | AuthError::MfaChallengeNotFound
            | AuthError::MfaExpired
            | AuthError::MfaInvalidCode
            | AuthError::AccountWithdrawn => AppError::unauthorized("Authentication failed"),
            AuthError::MfaRateLimited => AppError::rate_limited("MFA attempts exhausted"),
            AuthError::Database(_) => {
                AppError::new(ErrorKind::OperationFailed, "Persistence operation failed")
            }
            AuthError::Notification(_) => {
                AppError::new(ErrorKind::OperationFailed, "Notification delivery failed")
            }
            AuthError::Internal(_) => AppError::internal("Internal error"),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::GoogleVerification(e) => {
                tracing::warn!(error = %e, "Google ID-token rejected");
            }
            AuthError::MfaRateLimited => {
                tracing::warn!("MFA attempts exhausted");
            }
            AuthError::Notification(e) => {
                tracing::error!(error = %e, "MFA notification failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Validation(err)
    }
}
