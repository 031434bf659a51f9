//! WhatsApp delivery.

mod sender;
pub mod templates;
mod twilio;

pub use sender::{DisabledWhatsAppSender, WhatsAppSender};
pub use twilio::TwilioWhatsAppSender;
