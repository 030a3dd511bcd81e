//! MFA Challenge Store
//!
//! Per-email one-time codes for the business login flow. Process-local:
//! a single mutex over the challenge map, plus a periodic sweeper for
//! expired entries. Codes reach the operator through the notification
//! collaborator; this store only generates and validates them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{AuthError, AuthResult};
use crate::sweeper::{SweeperHandle, spawn_sweeper};

/// Challenge lifetime
pub const MFA_CODE_TTL: Duration = Duration::from_secs(10 * 60);
/// Verification attempts allowed per challenge
pub const MFA_MAX_ATTEMPTS: u32 = 5;
/// Challenge-map sweep interval
pub const MFA_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A pending challenge for one email
#[derive(Debug, Clone)]
struct MfaChallenge {
    /// Six-digit decimal, zero-padded
    code: String,
    expires_at: DateTime<Utc>,
    attempts: u32,
}

/// MFA challenge store configuration
#[derive(Debug, Clone)]
pub struct MfaConfig {
    pub code_ttl: Duration,
    pub max_attempts: u32,
}

impl Default for MfaConfig {
    fn default() -> Self {
        Self {
            code_ttl: MFA_CODE_TTL,
            max_attempts: MFA_MAX_ATTEMPTS,
        }
    }
}

/// Challenge store keyed by email
pub struct MfaChallengeStore {
    entries: Mutex<HashMap<String, MfaChallenge>>,
    config: MfaConfig,
}

impl MfaChallengeStore {
    pub fn new(config: MfaConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Generate a fresh challenge for the email, replacing any prior one.
    /// Returns the code for delivery through the notification sender.
    pub fn generate(&self, email: &str) -> String {
        let code = platform::crypto::six_digit_code();
        let ttl = chrono::Duration::from_std(self.config.code_ttl)
            .unwrap_or_else(|_| chrono::Duration::minutes(10));

        let challenge = MfaChallenge {
            code: code.clone(),
            expires_at: Utc::now() + ttl,
            attempts: 0,
        };

        self.entries
            .lock()
            .expect("mfa lock poisoned")
            .insert(email.to_string(), challenge);

        tracing::debug!(email = %email, "MFA challenge generated");
        code
    }

    /// Verify a candidate code.
    ///
    /// Rules, in order: missing challenge; expired (entry deleted);
    /// attempts exhausted (entry deleted); attempt counted; wrong code
    /// (entry retained for retry); success (entry consumed).
    pub fn verify(&self, email: &str, candidate: &str) -> AuthResult<()> {
        let mut entries = self.entries.lock().expect("mfa lock poisoned");

        let challenge = entries
            .get_mut(email)
            .ok_or(AuthError::MfaChallengeNotFound)?;

        if Utc::now() > challenge.expires_at {
            entries.remove(email);
            return Err(AuthError::MfaExpired);
        }

        if challenge.attempts >= self.config.max_attempts {
            entries.remove(email);
            return Err(AuthError::MfaRateLimited);
        }

        challenge.attempts += 1;

        if !platform::crypto::constant_time_eq(challenge.code.as_bytes(), candidate.as_bytes()) {
            return Err(AuthError::MfaInvalidCode);
        }

        entries.remove(email);
        Ok(())
    }

    /// Drop challenges past their expiry
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock().expect("mfa lock poisoned");
        let before = entries.len();
        entries.retain(|_, challenge| challenge.expires_at >= now);
        before - entries.len()
    }

    /// Spawn the periodic challenge sweeper
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let store = Arc::clone(self);
        spawn_sweeper("mfa-challenges", MFA_SWEEP_INTERVAL, move || {
            store.sweep_expired()
        })
    }

    /// Number of pending challenges (for observability)
    pub fn pending_len(&self) -> usize {
        self.entries.lock().expect("mfa lock poisoned").len()
    }

    #[cfg(test)]
    fn force_expire(&self, email: &str) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(challenge) = entries.get_mut(email) {
            challenge.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }
}

impl Default for MfaChallengeStore {
    fn default() -> Self {
        Self::new(MfaConfig::default())
    }
}
