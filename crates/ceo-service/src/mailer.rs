//! Fire-and-log email delivery for request handlers.
//!
//! Transactional emails (verification, invitations, review notices) are
//! sent after the database work has committed. A failed send is logged
//! and never turns a successful request into an error.

use ceo_core::CeoResult;
use ceo_notify::{EmailMessage, EmailSender, EmailTemplates};
use std::sync::Arc;
use tracing::{debug, warn};

/// Email sender paired with the message templates.
#[derive(Clone)]
pub struct Mailer {
    sender: Arc<dyn EmailSender>,
    templates: EmailTemplates,
}

impl Mailer {
    /// Creates a new mailer.
    #[must_use]
    pub fn new(sender: Arc<dyn EmailSender>, templates: EmailTemplates) -> Self {
        Self { sender, templates }
    }

    /// Message templates.
    #[must_use]
    pub fn templates(&self) -> &EmailTemplates {
        &self.templates
    }

    /// Sends a message and reports the transport error.
    pub async fn try_send(&self, to: &str, message: EmailMessage) -> CeoResult<()> {
        self.sender.send(to, message).await
    }

    /// Sends a message, logging a failure. Returns whether it was accepted.
    pub async fn send(&self, to: &str, message: EmailMessage) -> bool {
        let subject = message.subject.clone();
        match self.sender.send(to, message).await {
            Ok(()) => {
                debug!(to = %to, subject = %subject, transport = self.sender.name(), "Email sent");
                true
            }
            Err(e) => {
                warn!(to = %to, subject = %subject, error = %e, "Failed to send email");
                false
            }
        }
    }

    /// Sends the same message to several recipients, one at a time.
    pub async fn send_all<'a, I>(&self, recipients: I, message: &EmailMessage) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sent = 0;
        for to in recipients {
            if self.send(to, message.clone()).await {
                sent += 1;
            }
        }
        sent
    }
}

impl std::fmt::Debug for Mailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailer")
            .field("transport", &self.sender.name())
            .finish_non_exhaustive()
    }
}
