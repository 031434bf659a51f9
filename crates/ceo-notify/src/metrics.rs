//! Delivery counters.

use metrics::{counter, describe_counter};

/// Metric names for outbound delivery.
pub mod names {
    /// Delivery attempts, labelled by `channel` and `status`.
    pub const DELIVERIES_TOTAL: &str = "ceo_notification_deliveries_total";
    /// Emails accepted by the SMTP server.
    pub const EMAILS_SENT_TOTAL: &str = "ceo_emails_sent_total";
    /// Emails the transport rejected.
    pub const EMAILS_FAILED_TOTAL: &str = "ceo_emails_failed_total";
    /// WhatsApp messages accepted by the provider.
    pub const WHATSAPP_SENT_TOTAL: &str = "ceo_whatsapp_sent_total";
    /// WhatsApp messages the provider rejected.
    pub const WHATSAPP_FAILED_TOTAL: &str = "ceo_whatsapp_failed_total";
}

/// Register metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::DELIVERIES_TOTAL, "Notification delivery attempts by channel and outcome");
    describe_counter!(names::EMAILS_SENT_TOTAL, "Emails accepted by the SMTP server");
    describe_counter!(names::EMAILS_FAILED_TOTAL, "Emails rejected by the SMTP server");
    describe_counter!(names::WHATSAPP_SENT_TOTAL, "WhatsApp messages accepted by the provider");
    describe_counter!(names::WHATSAPP_FAILED_TOTAL, "WhatsApp messages rejected by the provider");
}

/// Record one notification delivery attempt.
pub fn record_delivery(channel: &'static str, status: &'static str) {
    counter!(names::DELIVERIES_TOTAL, "channel" => channel, "status" => status).increment(1);
}

pub(crate) fn record_email(success: bool) {
    if success {
        counter!(names::EMAILS_SENT_TOTAL).increment(1);
    } else {
        counter!(names::EMAILS_FAILED_TOTAL).increment(1);
    }
}

pub(crate) fn record_whatsapp(success: bool) {
    if success {
        counter!(names::WHATSAPP_SENT_TOTAL).increment(1);
    } else {
        counter!(names::WHATSAPP_FAILED_TOTAL).increment(1);
    }
}
