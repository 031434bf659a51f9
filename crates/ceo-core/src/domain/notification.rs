//! Notifications and delivery channels.

use super::user::Contact;
use crate::{NotificationId, NotificationTemplateId, OrgId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Whatsapp,
    InApp,
}

impl Channel {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
            Self::InApp => "in_app",
        }
    }

    /// All channels.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Email, Self::Whatsapp, Self::InApp]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "whatsapp" => Ok(Self::Whatsapp),
            "in_app" => Ok(Self::InApp),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// Outcome of a delivery on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Success,
    Failed,
}

impl DeliveryStatus {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user channel opt-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub whatsapp: bool,
    pub in_app: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            whatsapp: false,
            in_app: true,
        }
    }
}

impl NotificationPreferences {
    /// Whether the user accepts messages on this channel.
    #[must_use]
    pub const fn allows(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::Whatsapp => self.whatsapp,
            Channel::InApp => self.in_app,
        }
    }

    /// Applies a partial update.
    #[must_use]
    pub fn merge(self, update: PreferencesUpdate) -> Self {
        Self {
            email: update.email.unwrap_or(self.email),
            whatsapp: update.whatsapp.unwrap_or(self.whatsapp),
            in_app: update.in_app.unwrap_or(self.in_app),
        }
    }

    /// Requested channels the user accepts, in request order without repeats.
    #[must_use]
    pub fn filter(&self, requested: &[Channel]) -> Vec<Channel> {
        let mut channels = Vec::with_capacity(requested.len());
        for channel in requested {
            if self.allows(*channel) && !channels.contains(channel) {
                channels.push(*channel);
            }
        }
        channels
    }
}

/// A partial preferences update; omitted channels keep their value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PreferencesUpdate {
    pub email: Option<bool>,
    pub whatsapp: Option<bool>,
    pub in_app: Option<bool>,
}

/// A user a notification is addressed to, with their opt-ins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub contact: Contact,
    pub preferences: NotificationPreferences,
}

/// A broadcast as authored by a manager.
#[derive(Debug, Clone)]
pub struct NewNotificationTemplate {
    pub org_id: OrgId,
    pub created_by: UserId,
    pub name: String,
    pub title: String,
    pub content: String,
    pub notification_type: String,
    pub channels: Vec<Channel>,
}

/// A notification addressed to a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Notification {
    pub id: NotificationId,
    pub template_id: Option<NotificationTemplateId>,
    pub org_id: OrgId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    /// Latest delivery status per channel.
    pub status: BTreeMap<Channel, DeliveryStatus>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether the user has opened it.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// Fields needed to insert a per-user notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub template_id: Option<NotificationTemplateId>,
    pub org_id: OrgId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub notification_type: String,
}

/// One delivery attempt, persisted as a `notification_logs` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeliveryAttempt {
    pub channel: Channel,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DeliveryAttempt {
    /// A successful attempt.
    #[must_use]
    pub const fn success(channel: Channel) -> Self {
        Self {
            channel,
            status: DeliveryStatus::Success,
            error_message: None,
        }
    }

    /// A failed attempt with its reason.
    #[must_use]
    pub fn failed(channel: Channel, reason: impl Into<String>) -> Self {
        Self {
            channel,
            status: DeliveryStatus::Failed,
            error_message: Some(reason.into()),
        }
    }
}
