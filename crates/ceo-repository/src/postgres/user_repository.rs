//! Postgres user repository implementation.

use super::{parse_role, role_names};
use crate::{traits::UserRepository, DatabasePoolInterface};
use async_trait::async_trait;
use ceo_core::{
    CeoError, CeoResult, Contact, Member, NewUser, NotificationPreferences, OrgId, Page, PageRequest,
    RoleName, User, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// Columns selected for every [`UserRow`], qualified by the `u` alias.
pub(crate) const USER_COLUMNS: &str = r#"
    u.id, u.name, u.email, u.password, u.role, u.org_id, u.phone_number,
    u.whatsapp_number, u.notification_preferences, u.active, u.is_verified,
    u.last_login, u.created_at, u.updated_at
"#;

/// Postgres user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgUserRepository {
    /// Creates a new Postgres user repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    id: i32,
    name: String,
    email: String,
    password: Option<String>,
    role: Option<String>,
    org_id: Option<i32>,
    phone_number: Option<String>,
    whatsapp_number: Option<String>,
    notification_preferences: Json<NotificationPreferences>,
    active: bool,
    is_verified: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CeoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password,
            role: row.role.as_deref().map(parse_role).transpose()?,
            org_id: row.org_id.map(OrgId),
            phone_number: row.phone_number,
            whatsapp_number: row.whatsapp_number,
            notification_preferences: row.notification_preferences.0,
            active: row.active,
            is_verified: row.is_verified,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    #[sqlx(flatten)]
    user: UserRow,
    roles: Vec<String>,
}

impl TryFrom<MemberRow> for Member {
    type Error = CeoError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| parse_role(r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Member {
            user: User::try_from(row.user)?,
            roles,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ContactRow {
    pub(crate) id: i32,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) whatsapp_number: Option<String>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: UserId(row.id),
            name: row.name,
            email: row.email,
            whatsapp_number: row.whatsapp_number,
        }
    }
}

/// Roles aggregated per user inside an organization.
const MEMBER_ROLES: &str = r#"
    COALESCE(
        ARRAY_AGG(r.name ORDER BY r.name) FILTER (WHERE r.name IS NOT NULL),
        '{}'
    )::text[] AS roles
"#;

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> CeoResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> CeoResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE LOWER(u.email) = LOWER($1)");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> CeoResult<bool> {
        let result: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) LIMIT 1")
                .bind(email)
                .fetch_optional(self.pool.inner())
                .await?;

        Ok(result.is_some())
    }

    async fn create(&self, user: NewUser) -> CeoResult<User> {
        debug!("Creating user: {}", user.email);

        let sql = format!(
            r#"
            INSERT INTO users AS u (name, email, password, role, org_id, active,
                                    verification_token, invitation_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.map(|r| r.as_str()))
            .bind(user.org_id)
            .bind(user.active)
            .bind(&user.verification_token)
            .bind(&user.invitation_token)
            .fetch_one(self.pool.inner())
            .await?;

        User::try_from(row)
    }

    async fn verify_email(&self, token: &str) -> CeoResult<Option<User>> {
        debug!("Verifying email token");

        let sql = format!(
            r#"
            UPDATE users AS u
            SET is_verified = TRUE, verification_token = NULL, updated_at = NOW()
            WHERE u.verification_token = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(token)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn set_reset_token(&self, id: UserId, token: &str, expires_at: DateTime<Utc>) -> CeoResult<()> {
        debug!("Setting reset token for user: {}", id);

        sqlx::query(
            r#"
            UPDATE users
            SET reset_token = $1, reset_token_expiry = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .bind(id)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn reset_password(&self, token: &str, password_hash: &str, now: DateTime<Utc>) -> CeoResult<bool> {
        debug!("Resetting password with token");

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password = $1, reset_token = NULL, reset_token_expiry = NULL, updated_at = NOW()
            WHERE reset_token = $2 AND reset_token_expiry > $3
            "#,
        )
        .bind(password_hash)
        .bind(token)
        .bind(now)
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn accept_invitation(&self, token: &str, password_hash: &str) -> CeoResult<Option<User>> {
        debug!("Accepting invitation token");

        let sql = format!(
            r#"
            UPDATE users AS u
            SET password = $1, active = TRUE, is_verified = TRUE,
                invitation_token = NULL, updated_at = NOW()
            WHERE u.invitation_token = $2
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(password_hash)
            .bind(token)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn record_login(&self, id: UserId) -> CeoResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool.inner())
            .await?;
        Ok(())
    }

    async fn find_roles(&self, id: UserId, org_id: OrgId) -> CeoResult<Vec<RoleName>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1 AND ur.org_id = $2
            ORDER BY r.name
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_all(self.pool.inner())
        .await?;

        names.iter().map(|n| parse_role(n)).collect()
    }

    async fn find_member(&self, id: UserId, org_id: OrgId) -> CeoResult<Option<Member>> {
        debug!("Finding member {} in organization {}", id, org_id);

        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}, {MEMBER_ROLES}
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id AND ur.org_id = u.org_id
            LEFT JOIN roles r ON r.id = ur.role_id
            WHERE u.id = $1 AND u.org_id = $2
            GROUP BY u.id
            "#
        );
        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(id)
            .bind(org_id)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(Member::try_from).transpose()
    }

    async fn list_members(&self, org_id: OrgId, page: PageRequest) -> CeoResult<Page<Member>> {
        debug!("Listing members of organization {}, page: {}, limit: {}", org_id, page.page, page.limit);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE org_id = $1")
            .bind(org_id)
            .fetch_one(self.pool.inner())
            .await?;

        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}, {MEMBER_ROLES}
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id AND ur.org_id = u.org_id
            LEFT JOIN roles r ON r.id = ur.role_id
            WHERE u.org_id = $1
            GROUP BY u.id
            ORDER BY u.created_at DESC, u.id DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(org_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool.inner())
            .await?;

        let members = rows
            .into_iter()
            .map(Member::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(members, page, u64::try_from(total).unwrap_or_default()))
    }

    async fn find_contacts_by_roles(&self, org_id: OrgId, roles: &[RoleName]) -> CeoResult<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT DISTINCT u.id, u.name, u.email, u.whatsapp_number
            FROM users u
            JOIN user_roles ur ON ur.user_id = u.id AND ur.org_id = $1
            JOIN roles r ON r.id = ur.role_id
            WHERE u.org_id = $1 AND u.active = TRUE AND r.name = ANY($2)
            ORDER BY u.id
            "#,
        )
        .bind(org_id)
        .bind(role_names(roles))
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn update_preferences(&self, id: UserId, preferences: NotificationPreferences) -> CeoResult<()> {
        debug!("Updating notification preferences for user: {}", id);

        let result = sqlx::query(
            "UPDATE users SET notification_preferences = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(Json(preferences))
        .bind(id)
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CeoError::not_found("User", id));
        }
        Ok(())
    }

    async fn start_whatsapp_verification(
        &self,
        id: UserId,
        number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> CeoResult<()> {
        debug!("Starting WhatsApp verification for user: {}", id);

        sqlx::query(
            r#"
            UPDATE users
            SET pending_whatsapp_number = $1, whatsapp_verification_code = $2,
                whatsapp_verification_expiry = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(number)
        .bind(code)
        .bind(expires_at)
        .bind(id)
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn confirm_whatsapp(&self, id: UserId, code: &str, now: DateTime<Utc>) -> CeoResult<Option<String>> {
        debug!("Confirming WhatsApp number for user: {}", id);

        let number: Option<Option<String>> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET whatsapp_number = pending_whatsapp_number,
                pending_whatsapp_number = NULL,
                whatsapp_verification_code = NULL,
                whatsapp_verification_expiry = NULL,
                updated_at = NOW()
            WHERE id = $1
              AND pending_whatsapp_number IS NOT NULL
              AND whatsapp_verification_code = $2
              AND whatsapp_verification_expiry > $3
            RETURNING whatsapp_number
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(now)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(number.flatten())
    }
}

impl std::fmt::Debug for PgUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUserRepository").finish_non_exhaustive()
    }
}
