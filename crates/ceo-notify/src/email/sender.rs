//! Email sender abstraction.

use async_trait::async_trait;
use ceo_core::{CeoResult, Interface};
use tracing::info;

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    /// Creates a message from a subject and an HTML body.
    pub fn new(subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// Interface for sending emails.
#[async_trait]
pub trait EmailSender: Interface + Send + Sync {
    /// Sends a message to a single recipient.
    async fn send(&self, to: &str, message: EmailMessage) -> CeoResult<()>;

    /// Short transport name used in logs.
    fn name(&self) -> &'static str;
}

/// Sender used when email is disabled. Logs the message and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, to: &str, message: EmailMessage) -> CeoResult<()> {
        info!(to = %to, subject = %message.subject, "Email delivery disabled, message not sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
