//! WhatsApp sender abstraction.

use async_trait::async_trait;
use ceo_core::{CeoError, CeoResult, Interface};

/// Interface for sending WhatsApp messages.
#[async_trait]
pub trait WhatsAppSender: Interface + Send + Sync {
    /// Sends a text message to a phone number in international format.
    async fn send(&self, to: &str, body: &str) -> CeoResult<()>;

    /// Whether messages can be delivered at all.
    fn is_enabled(&self) -> bool;
}

/// Sender used when WhatsApp is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledWhatsAppSender;

#[async_trait]
impl WhatsAppSender for DisabledWhatsAppSender {
    async fn send(&self, _to: &str, _body: &str) -> CeoResult<()> {
        Err(CeoError::external("whatsapp", "WhatsApp delivery is not configured"))
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
