//! Outbound notification contract.
//!
//! The core never talks to a mail server. It hands `(recipient, subject,
//! body)` to a [`Notifier`] and only cares whether delivery was accepted.
//! Whether a failure is fatal is decided by the caller: OTP dispatch
//! propagates it, registration and upload notices only log it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

use crate::ServiceError;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("delivery to {recipient} failed: {reason}")]
    Delivery { recipient: String, reason: String },
}

/// Sends a single plain-text message.
pub trait Notifier: Send + Sync {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes every message to the tracing log under the `assura::mail` target.
///
/// Meant for development deployments: the message body (including one-time
/// codes) ends up in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(target: "assura::mail", %recipient, %subject, "{body}");
        Ok(())
    }
}

/// A message captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Keeps sent messages in memory. Can be switched into a failing mode to
/// exercise delivery-failure paths.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    outbox: Mutex<Vec<OutboundMessage>>,
    failing: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All accepted messages, oldest first.
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.outbox.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recent message sent to `recipient`.
    pub fn last_to(&self, recipient: &str) -> Option<OutboundMessage> {
        self.outbox
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|m| m.recipient == recipient)
            .cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery {
                recipient: recipient.to_string(),
                reason: "notifier is in failing mode".into(),
            });
        }
        self.outbox
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(OutboundMessage {
                recipient: recipient.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        Ok(())
    }
}

/// Resolves who should hear about events that need a privileged reviewer
/// (e.g. a user uploading a document).
///
/// Implemented by the auth service; the documents module only sees this trait.
pub trait ReviewerDirectory: Send + Sync {
    fn reviewer_email(&self) -> Result<Option<String>, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_records() {
        let n = MemoryNotifier::new();
        n.send("a@x.com", "hi", "one").unwrap();
        n.send("b@x.com", "hi", "two").unwrap();
        n.send("a@x.com", "hi", "three").unwrap();

        assert_eq!(n.messages().len(), 3);
        assert_eq!(n.last_to("a@x.com").unwrap().body, "three");
        assert!(n.last_to("c@x.com").is_none());
    }

    #[test]
    fn failing_mode_rejects() {
        let n = MemoryNotifier::new();
        n.set_failing(true);
        let err = n.send("a@x.com", "hi", "body").unwrap_err();
        assert!(err.to_string().contains("a@x.com"));
        assert!(n.messages().is_empty());

        n.set_failing(false);
        assert!(n.send("a@x.com", "hi", "body").is_ok());
    }

    #[test]
    fn log_notifier_accepts() {
        assert!(LogNotifier.send("a@x.com", "subject", "body").is_ok());
    }
}
