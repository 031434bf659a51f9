//! Postgres notification repository implementation.

use crate::{traits::NotificationRepository, DatabasePoolInterface};
use async_trait::async_trait;
use ceo_core::{
    CeoResult, Channel, Contact, DeliveryAttempt, DeliveryStatus, NewNotification,
    NewNotificationTemplate, Notification, NotificationId, NotificationPreferences,
    NotificationTemplateId, OrgId, Page, PageRequest, Recipient, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const NOTIFICATION_COLUMNS: &str = r#"
    id, template_id, org_id, user_id, title, content, type AS notification_type,
    status, read_at, created_at
"#;

/// Postgres notification repository implementation.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgNotificationRepository {
    /// Creates a new Postgres notification repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: i32,
    template_id: Option<i32>,
    org_id: i32,
    user_id: i32,
    title: String,
    content: String,
    notification_type: String,
    status: Json<BTreeMap<Channel, DeliveryStatus>>,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: NotificationId(row.id),
            template_id: row.template_id.map(NotificationTemplateId),
            org_id: OrgId(row.org_id),
            user_id: UserId(row.user_id),
            title: row.title,
            content: row.content,
            notification_type: row.notification_type,
            status: row.status.0,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RecipientRow {
    id: i32,
    name: String,
    email: String,
    whatsapp_number: Option<String>,
    notification_preferences: Json<NotificationPreferences>,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Recipient {
            contact: Contact {
                id: UserId(row.id),
                name: row.name,
                email: row.email,
                whatsapp_number: row.whatsapp_number,
            },
            preferences: row.notification_preferences.0,
        }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create_template(&self, template: NewNotificationTemplate) -> CeoResult<NotificationTemplateId> {
        debug!("Creating notification template '{}' in organization {}", template.name, template.org_id);

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO notification_templates (name, title, content, type, channels, org_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&template.name)
        .bind(&template.title)
        .bind(&template.content)
        .bind(&template.notification_type)
        .bind(Json(&template.channels))
        .bind(template.org_id)
        .bind(template.created_by)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(NotificationTemplateId(id))
    }

    async fn find_recipients(&self, org_id: OrgId, user_ids: Option<&[UserId]>) -> CeoResult<Vec<Recipient>> {
        let ids: Option<Vec<i32>> = user_ids.map(|ids| ids.iter().map(|id| id.into_inner()).collect());

        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, name, email, whatsapp_number, notification_preferences
            FROM users
            WHERE org_id = $1 AND active = TRUE
              AND ($2::int4[] IS NULL OR id = ANY($2))
            ORDER BY id
            "#,
        )
        .bind(org_id)
        .bind(ids)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn create(&self, notification: NewNotification) -> CeoResult<Notification> {
        let sql = format!(
            r#"
            INSERT INTO notifications (template_id, org_id, user_id, title, content, type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(notification.template_id)
            .bind(notification.org_id)
            .bind(notification.user_id)
            .bind(&notification.title)
            .bind(&notification.content)
            .bind(&notification.notification_type)
            .fetch_one(self.pool.inner())
            .await?;

        Ok(Notification::from(row))
    }

    async fn record_attempt(&self, id: NotificationId, attempt: &DeliveryAttempt) -> CeoResult<()> {
        let mut tx = self.pool.inner().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO notification_logs (notification_id, channel, status, error_message)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(attempt.channel.as_str())
        .bind(attempt.status.as_str())
        .bind(&attempt.error_message)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE notifications
            SET status = status || jsonb_build_object($2::text, $3::text)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(attempt.channel.as_str())
        .bind(attempt.status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId, unread_only: bool, page: PageRequest) -> CeoResult<Page<Notification>> {
        debug!("Listing notifications of user {}, unread_only: {}", user_id, unread_only);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)",
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(self.pool.inner())
        .await?;

        let sql = format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR read_at IS NULL)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(user_id)
            .bind(unread_only)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool.inner())
            .await?;

        let items = rows.into_iter().map(Notification::from).collect();
        Ok(Page::new(items, page, u64::try_from(total).unwrap_or_default()))
    }

    async fn unread_for_user(&self, user_id: UserId) -> CeoResult<Vec<Notification>> {
        let sql = format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE user_id = $1 AND read_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool.inner())
            .await?;

        Ok(rows.into_iter().map(Notification::from).collect())
    }

    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> CeoResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = COALESCE(read_at, NOW()) WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl std::fmt::Debug for PgNotificationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgNotificationRepository").finish_non_exhaustive()
    }
}
