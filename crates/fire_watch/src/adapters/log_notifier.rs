// Rust guideline compliant 2026-10-13

//! Dry-run adapter for the `Notifier` port.
//!
//! Logs the alert via `tracing::warn!` and returns a locally generated
//! message id. Never fails.

use domain::{MessageId, NotificationError, Notifier};

/// `Notifier` adapter that only logs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a new log notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    async fn send_alert(&self, body: &str) -> Result<MessageId, NotificationError> {
        let message_id = MessageId(format!("dry-run-{}", uuid::Uuid::new_v4()));
        tracing::warn!(message_id = %message_id, body, "log_notifier.alert");
        Ok(message_id)
    }
}
