//! Notification service implementation.
//!
//! A broadcast creates one notification per recipient and then tries every
//! requested channel the recipient accepts. Each attempt is logged on its own
//! row; a failed channel never stops the others.

use crate::dto::{
    ConfirmWhatsAppRequest, MessageResponse, NotificationFilter, NotificationListResponse,
    RecipientDelivery, SendNotificationRequest, SendNotificationResponse, VerifyWhatsAppRequest,
};
use crate::{expires_after, Mailer};
use ceo_config::SecurityConfig;
use ceo_core::{
    CeoError, CeoResult, Channel, DeliveryAttempt, Interface, NewNotification,
    NewNotificationTemplate, Notification, NotificationId, NotificationPreferences,
    NotificationTemplateId, OrgId, PageRequest, PreferencesUpdate, Recipient, ValidateExt,
};
use ceo_notify::metrics::record_delivery;
use ceo_notify::whatsapp::templates;
use ceo_notify::WhatsAppSender;
use ceo_repository::{NotificationRepository, UserRepository};
use ceo_security::{generate_verification_code, Claims, ClaimsExt};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notification service trait.
#[async_trait]
pub trait NotificationService: Interface + Send + Sync {
    /// Broadcasts a notification to members of the caller's organization. CEO or project manager.
    async fn send(&self, claims: &Claims, request: SendNotificationRequest) -> CeoResult<SendNotificationResponse>;

    /// The caller's notifications.
    async fn list(
        &self,
        claims: &Claims,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> CeoResult<NotificationListResponse>;

    /// All unread notifications of the caller.
    async fn unread(&self, claims: &Claims) -> CeoResult<Vec<Notification>>;

    /// Marks one of the caller's notifications as read.
    async fn mark_read(&self, claims: &Claims, id: NotificationId) -> CeoResult<MessageResponse>;

    /// Merges channel opt-ins into the stored preferences.
    async fn update_preferences(
        &self,
        claims: &Claims,
        update: PreferencesUpdate,
    ) -> CeoResult<NotificationPreferences>;

    /// Sends a verification code to a WhatsApp number.
    async fn start_whatsapp_verification(
        &self,
        claims: &Claims,
        request: VerifyWhatsAppRequest,
    ) -> CeoResult<MessageResponse>;

    /// Confirms the pending WhatsApp number.
    async fn confirm_whatsapp(&self, claims: &Claims, request: ConfirmWhatsAppRequest) -> CeoResult<MessageResponse>;
}

/// Notification service implementation.
pub struct NotificationServiceImpl {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
    mailer: Mailer,
    whatsapp: Arc<dyn WhatsAppSender>,
    config: Arc<SecurityConfig>,
}

/// What every recipient of one broadcast receives.
struct Broadcast<'a> {
    template_id: NotificationTemplateId,
    org_id: OrgId,
    title: &'a str,
    content: &'a str,
    notification_type: &'a str,
    channels: &'a [Channel],
}

impl NotificationServiceImpl {
    /// Creates a new notification service.
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
        mailer: Mailer,
        whatsapp: Arc<dyn WhatsAppSender>,
        config: Arc<SecurityConfig>,
    ) -> Self {
        Self {
            notifications,
            users,
            mailer,
            whatsapp,
            config,
        }
    }

    /// Delivers to one recipient. `None` when the notification row could not be created.
    async fn deliver(&self, broadcast: &Broadcast<'_>, recipient: Recipient) -> Option<RecipientDelivery> {
        let user_id = recipient.contact.id;
        let notification = match self
            .notifications
            .create(NewNotification {
                template_id: Some(broadcast.template_id),
                org_id: broadcast.org_id,
                user_id,
                title: broadcast.title.to_string(),
                content: broadcast.content.to_string(),
                notification_type: broadcast.notification_type.to_string(),
            })
            .await
        {
            Ok(notification) => notification,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to create notification");
                return None;
            }
        };

        let mut attempts = Vec::new();
        for channel in recipient.preferences.filter(broadcast.channels) {
            let attempt = self.attempt(channel, broadcast, &recipient).await;

            if let Err(e) = self.notifications.record_attempt(notification.id, &attempt).await {
                warn!(notification_id = %notification.id, channel = %channel, error = %e, "Failed to record delivery attempt");
            }
            record_delivery(channel.as_str(), attempt.status.as_str());
            attempts.push(attempt);
        }

        Some(RecipientDelivery { user_id, attempts })
    }

    async fn attempt(&self, channel: Channel, broadcast: &Broadcast<'_>, recipient: &Recipient) -> DeliveryAttempt {
        match channel {
            Channel::Email => {
                let message = self
                    .mailer
                    .templates()
                    .notification(broadcast.title, broadcast.content);
                match self.mailer.try_send(&recipient.contact.email, message).await {
                    Ok(()) => DeliveryAttempt::success(channel),
                    Err(e) => DeliveryAttempt::failed(channel, e.to_string()),
                }
            }
            Channel::Whatsapp => {
                if !self.whatsapp.is_enabled() {
                    return DeliveryAttempt::failed(channel, "WhatsApp delivery is not configured");
                }
                let Some(number) = recipient.contact.whatsapp_number.as_deref() else {
                    return DeliveryAttempt::failed(channel, "User has no verified WhatsApp number");
                };
                let body = templates::notification(broadcast.title, broadcast.content);
                match self.whatsapp.send(number, &body).await {
                    Ok(()) => DeliveryAttempt::success(channel),
                    Err(e) => DeliveryAttempt::failed(channel, e.to_string()),
                }
            }
            Channel::InApp => DeliveryAttempt::success(channel),
        }
    }
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    async fn send(&self, claims: &Claims, request: SendNotificationRequest) -> CeoResult<SendNotificationResponse> {
        claims.require_manager()?;
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, "Sending notification: {}", request.title);

        request.validate_request()?;

        let template_id = self
            .notifications
            .create_template(NewNotificationTemplate {
                org_id,
                created_by: claims.user_id,
                name: request.title.clone(),
                title: request.title.clone(),
                content: request.content.clone(),
                notification_type: request.notification_type.clone(),
                channels: request.channels.clone(),
            })
            .await?;

        let recipients = self
            .notifications
            .find_recipients(org_id, request.user_ids.as_deref())
            .await?;
        let recipient_count = recipients.len();

        let broadcast = Broadcast {
            template_id,
            org_id,
            title: &request.title,
            content: &request.content,
            notification_type: &request.notification_type,
            channels: &request.channels,
        };
        let deliveries: Vec<RecipientDelivery> = join_all(
            recipients
                .into_iter()
                .map(|recipient| self.deliver(&broadcast, recipient)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        info!(
            org_id = %org_id,
            template_id = %template_id,
            recipients = recipient_count,
            "Notification sent"
        );

        Ok(SendNotificationResponse {
            template_id,
            recipients: recipient_count,
            deliveries,
        })
    }

    async fn list(
        &self,
        claims: &Claims,
        filter: NotificationFilter,
        page: PageRequest,
    ) -> CeoResult<NotificationListResponse> {
        let notifications = self
            .notifications
            .list_for_user(claims.user_id, filter.unread_only, page)
            .await?;
        Ok(NotificationListResponse {
            notifications: notifications.items,
            pagination: notifications.pagination,
        })
    }

    async fn unread(&self, claims: &Claims) -> CeoResult<Vec<Notification>> {
        self.notifications.unread_for_user(claims.user_id).await
    }

    async fn mark_read(&self, claims: &Claims, id: NotificationId) -> CeoResult<MessageResponse> {
        if !self.notifications.mark_read(id, claims.user_id).await? {
            return Err(CeoError::not_found("Notification", id));
        }
        Ok(MessageResponse::new("Notification marked as read"))
    }

    async fn update_preferences(
        &self,
        claims: &Claims,
        update: PreferencesUpdate,
    ) -> CeoResult<NotificationPreferences> {
        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| CeoError::not_found("User", claims.user_id))?;

        let preferences = user.notification_preferences.merge(update);
        self.users.update_preferences(user.id, preferences).await?;

        debug!(user_id = %user.id, ?preferences, "Notification preferences updated");
        Ok(preferences)
    }

    async fn start_whatsapp_verification(
        &self,
        claims: &Claims,
        request: VerifyWhatsAppRequest,
    ) -> CeoResult<MessageResponse> {
        request.validate_request()?;

        let code = generate_verification_code();
        let expires_at = expires_after(self.config.whatsapp_code_ttl())?;
        self.users
            .start_whatsapp_verification(claims.user_id, &request.whatsapp_number, &code, expires_at)
            .await?;

        self.whatsapp
            .send(&request.whatsapp_number, &templates::verification_code(&code))
            .await?;

        info!(user_id = %claims.user_id, "WhatsApp verification code sent");
        Ok(MessageResponse::new("Verification code sent"))
    }

    async fn confirm_whatsapp(&self, claims: &Claims, request: ConfirmWhatsAppRequest) -> CeoResult<MessageResponse> {
        request.validate_request()?;

        let number = self
            .users
            .confirm_whatsapp(claims.user_id, &request.code, Utc::now())
            .await?
            .ok_or_else(|| CeoError::validation("Invalid or expired verification code"))?;

        info!(user_id = %claims.user_id, "WhatsApp number verified");

        if let Err(e) = self.whatsapp.send(&number, &templates::welcome(&claims.name)).await {
            warn!(user_id = %claims.user_id, error = %e, "Failed to send WhatsApp welcome");
        }

        Ok(MessageResponse::new("WhatsApp number verified successfully"))
    }
}

impl std::fmt::Debug for NotificationServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationServiceImpl")
            .field("whatsapp_enabled", &self.whatsapp.is_enabled())
            .finish_non_exhaustive()
    }
}
