//! Notification-related DTOs.

use ceo_core::{
    Channel, DeliveryAttempt, Notification, NotificationTemplateId, PageInfo, UserId,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Broadcasts a notification.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendNotificationRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Free-form category such as `announcement` or `reminder`.
    #[serde(rename = "type", default = "default_notification_type")]
    pub notification_type: String,

    /// Explicit recipients; every active member of the organization when absent.
    pub user_ids: Option<Vec<UserId>>,

    #[validate(length(min = 1, message = "At least one channel is required"))]
    pub channels: Vec<Channel>,
}

fn default_notification_type() -> String {
    "announcement".to_string()
}

/// Outcome of one recipient's delivery.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipientDelivery {
    pub user_id: UserId,
    pub attempts: Vec<DeliveryAttempt>,
}

/// Response to a broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendNotificationResponse {
    pub template_id: NotificationTemplateId,
    pub recipients: usize,
    pub deliveries: Vec<RecipientDelivery>,
}

/// Query for the notification list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread_only: bool,
}

/// Paginated notifications.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub pagination: PageInfo,
}

/// Starts WhatsApp number verification.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct VerifyWhatsAppRequest {
    #[validate(custom(function = "ceo_core::rules::phone_number", message = "Invalid phone number"))]
    pub whatsapp_number: String,
}

/// Confirms a WhatsApp number with the code that was sent to it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ConfirmWhatsAppRequest {
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}
