//! # CEO Notify
//!
//! Outbound message delivery for the CEO platform.
//!
//! - [`email`]: the [`EmailSender`] trait, an SMTP implementation built on
//!   lettre, a logging fallback and the HTML message templates.
//! - [`whatsapp`]: the [`WhatsAppSender`] trait, a Twilio implementation and
//!   the plain-text message templates.
//! - [`metrics`]: delivery counters.

pub mod email;
pub mod metrics;
pub mod whatsapp;

pub use email::{EmailMessage, EmailSender, EmailTemplates, LogEmailSender, SmtpEmailSender};
pub use whatsapp::{DisabledWhatsAppSender, TwilioWhatsAppSender, WhatsAppSender};

use ceo_config::{EmailConfig, WhatsAppConfig};
use ceo_core::CeoResult;
use std::sync::Arc;
use tracing::info;

/// Builds the email sender the configuration asks for.
pub fn create_email_sender(config: &EmailConfig) -> CeoResult<Arc<dyn EmailSender>> {
    if config.enabled {
        info!("Email delivery via SMTP {}:{}", config.smtp_host, config.smtp_port);
        Ok(Arc::new(SmtpEmailSender::new(config)?))
    } else {
        info!("Email delivery disabled, messages will be logged");
        Ok(Arc::new(LogEmailSender))
    }
}

/// Builds the WhatsApp sender the configuration asks for.
pub fn create_whatsapp_sender(config: &WhatsAppConfig) -> CeoResult<Arc<dyn WhatsAppSender>> {
    if config.enabled {
        info!("WhatsApp delivery via Twilio");
        Ok(Arc::new(TwilioWhatsAppSender::new(config)?))
    } else {
        info!("WhatsApp delivery disabled");
        Ok(Arc::new(DisabledWhatsAppSender))
    }
}
