//! Notification delivery for MFA codes
//!
//! The default build carries only stubs: the dev sender logs the code,
//! the memory sender captures it for tests. A real SMTP/SES sender is a
//! deployment concern and plugs in behind the same trait.

use std::sync::Mutex;

/// Error sending a notification
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Capability for delivering MFA codes out-of-band
#[trait_variant::make(NotificationSender: Send)]
pub trait LocalNotificationSender {
    async fn send_mfa_code(&self, email: &str, code: &str) -> Result<(), NotifyError>;
}

/// Development sender - logs the code instead of delivering it
///
/// 開発環境ではコードをログに出力するのみ（テストから読み取れる）
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSender;

impl NotificationSender for LogNotificationSender {
    async fn send_mfa_code(&self, email: &str, code: &str) -> Result<(), NotifyError> {
        tracing::info!(email = %email, code = %code, "[DEV] MFA code issued");
        Ok(())
    }
}

/// Test sender - captures sent codes in memory
#[derive(Debug, Default)]
pub struct MemoryNotificationSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl MemoryNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// All (email, code) pairs sent so far
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("notification lock poisoned").clone()
    }

    /// Most recent code sent to the given email
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .expect("notification lock poisoned")
            .iter()
            .rev()
            .find(|(e, _)| e == email)
            .map(|(_, code)| code.clone())
    }
}

impl NotificationSender for MemoryNotificationSender {
    async fn send_mfa_code(&self, email: &str, code: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notification lock poisoned")
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}
