//! Twilio WhatsApp sender.

use super::WhatsAppSender;
use crate::metrics::record_whatsapp;
use async_trait::async_trait;
use ceo_config::WhatsAppConfig;
use ceo_core::{CeoError, CeoResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Sends WhatsApp messages through the Twilio Messages API.
pub struct TwilioWhatsAppSender {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

impl TwilioWhatsAppSender {
    /// Creates a sender from configuration.
    pub fn new(config: &WhatsAppConfig) -> CeoResult<Self> {
        if !config.has_credentials() {
            return Err(CeoError::Configuration(
                "WhatsApp is enabled but Twilio credentials are missing".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CeoError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/2010-04-01/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

#[async_trait]
impl WhatsAppSender for TwilioWhatsAppSender {
    async fn send(&self, to: &str, body: &str) -> CeoResult<()> {
        debug!(to = %to, "Sending WhatsApp message");

        let form = [
            ("From", format!("whatsapp:{}", self.from_number)),
            ("To", format!("whatsapp:{to}")),
            ("Body", body.to_string()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                record_whatsapp(false);
                warn!(to = %to, error = %e, "Twilio request failed");
                provider_unavailable()
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            record_whatsapp(false);
            warn!(to = %to, status = %status, body = %text, "Twilio rejected WhatsApp message");
            return Err(provider_unavailable());
        }

        record_whatsapp(true);
        if let Ok(message) = response.json::<MessageResponse>().await {
            debug!(sid = %message.sid, "WhatsApp message accepted");
        }
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Client-facing error; the upstream response is only logged.
fn provider_unavailable() -> CeoError {
    CeoError::external("twilio", "WhatsApp provider unavailable")
}

impl std::fmt::Debug for TwilioWhatsAppSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioWhatsAppSender")
            .field("base_url", &self.base_url)
            .field("account_sid", &self.account_sid)
            .finish_non_exhaustive()
    }
}
