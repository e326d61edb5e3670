//! One-shot user notifications ("toasts").
//!
//! Fire-and-forget: the coordinator never waits for acknowledgment.

use std::sync::{Arc, Mutex, PoisonError};

/// Sink for user-visible success and error messages.
pub trait Notifier: Send + Sync {
    /// Report a completed action.
    fn success(&self, message: &str);

    /// Report a failed action.
    fn error(&self, message: &str);
}

/// Notifier that writes messages to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notification = "success", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(notification = "error", "{message}");
    }
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    /// Message text.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Error(m) => m,
        }
    }

    /// Whether this is an error notification.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Notifier that keeps every message in memory.
///
/// Clones share the same buffer, so a handle kept by the caller sees what
/// the coordinator emitted.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Only the error notifications.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(Notification::is_error)
            .map(|n| n.message().to_owned())
            .collect()
    }

    fn record(&self, notification: Notification) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.record(Notification::Success(message.to_owned()));
    }

    fn error(&self, message: &str) {
        self.record(Notification::Error(message.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_shares_buffer_between_clones() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();

        notifier.success("Order saved!");
        notifier.error("Couldn't update favorite");

        assert_eq!(handle.notifications().len(), 2);
        assert_eq!(handle.errors(), vec!["Couldn't update favorite".to_string()]);
    }
}
