//! Email delivery.

mod sender;
mod smtp;
mod templates;

pub use sender::{EmailMessage, EmailSender, LogEmailSender};
pub use smtp::SmtpEmailSender;
pub use templates::EmailTemplates;
