//! SMTP email sender.

use super::{EmailMessage, EmailSender};
use crate::metrics::record_email;
use async_trait::async_trait;
use ceo_config::{EmailConfig, SmtpTls};
use ceo_core::{CeoError, CeoResult};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

/// Sends email through an SMTP relay.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailSender {
    /// Creates a sender from configuration. Does not connect.
    pub fn new(config: &EmailConfig) -> CeoResult<Self> {
        let builder = match config.tls {
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host),
            SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host),
            SmtpTls::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)),
        }
        .map_err(|e| CeoError::Configuration(format!("Invalid SMTP relay '{}': {e}", config.smtp_host)))?;

        let mut builder = builder.port(config.smtp_port);
        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        let address: Address = config
            .from_address
            .parse()
            .map_err(|e| CeoError::Configuration(format!("Invalid sender address: {e}")))?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Checks that the SMTP server accepts connections.
    pub async fn test_connection(&self) -> CeoResult<bool> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| CeoError::external("smtp", e.to_string()))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, message: EmailMessage) -> CeoResult<()> {
        debug!(to = %to, subject = %message.subject, "Sending email");

        let recipient: Mailbox = to
            .parse()
            .map_err(|e| CeoError::validation(format!("Invalid recipient address '{to}': {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html)
            .map_err(|e| CeoError::internal(format!("Failed to build email: {e}")))?;

        match self.transport.send(email).await {
            Ok(_) => {
                record_email(true);
                Ok(())
            }
            Err(e) => {
                record_email(false);
                warn!(to = %to, error = %e, "SMTP delivery failed");
                Err(CeoError::external("smtp", e.to_string()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

impl std::fmt::Debug for SmtpEmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpEmailSender")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}
