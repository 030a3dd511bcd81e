//! Application Configuration
//!
//! Configuration for the Auth application layer. Token and MFA tuning
//! live with their own components ([`crate::token::TokenConfig`],
//! [`crate::mfa::MfaConfig`]); this holds what the login flows need.

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Google OAuth client id (ID-token audience)
    pub google_client_id: String,
    /// Length in bytes of the transient MFA session handle
    pub session_handle_bytes: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            google_client_id: String::new(),
            session_handle_bytes: 32,
        }
    }
}

impl AuthConfig {
    pub fn new(google_client_id: impl Into<String>) -> Self {
        Self {
            google_client_id: google_client_id.into(),
            ..Default::default()
        }
    }

    /// Development config with a placeholder client id
    pub fn development() -> Self {
        Self::new("placeholder-client-id")
    }
}
