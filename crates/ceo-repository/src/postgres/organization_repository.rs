//! Postgres organization repository implementation.

use super::{role_names, UserRow, USER_COLUMNS};
use crate::{traits::OrganizationRepository, DatabasePoolInterface};
use async_trait::async_trait;
use ceo_core::{CeoError, CeoResult, NewUser, OrgId, Organization, RoleName, User};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Transaction};
use std::sync::Arc;
use tracing::{debug, info};

/// Postgres organization repository implementation.
#[derive(Clone)]
pub struct PgOrganizationRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgOrganizationRepository {
    /// Creates a new Postgres organization repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OrganizationRow {
    id: i32,
    name: String,
    email: Option<String>,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization {
            id: OrgId(row.id),
            name: row.name,
            email: row.email,
            settings: row.settings,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Inserts a user inside an open transaction.
async fn insert_user(tx: &mut Transaction<'_, Postgres>, user: &NewUser) -> CeoResult<User> {
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
        .fetch_one(&mut **tx)
        .await?;

    User::try_from(row)
}

#[async_trait]
impl OrganizationRepository for PgOrganizationRepository {
    async fn create_with_owner(&self, org_name: &str, owner: NewUser) -> CeoResult<(Organization, User)> {
        debug!("Creating organization '{}' for {}", org_name, owner.email);

        let mut tx = self.pool.inner().begin().await?;

        let org: Organization = sqlx::query_as::<_, OrganizationRow>(
            r#"
            INSERT INTO organizations (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, settings, created_at, updated_at
            "#,
        )
        .bind(org_name)
        .bind(&owner.email)
        .fetch_one(&mut *tx)
        .await?
        .into();

        let owner = NewUser {
            org_id: Some(org.id),
            role: Some(RoleName::Ceo),
            ..owner
        };
        let user = insert_user(&mut tx, &owner).await?;

        let role_id: Option<i32> = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(RoleName::Ceo.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let role_id = role_id.ok_or_else(|| CeoError::Internal("CEO role is not seeded".to_string()))?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id, org_id) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(role_id)
            .bind(org.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Organization {} created with owner {}", org.id, user.id);
        Ok((org, user))
    }

    async fn invite_member(
        &self,
        org_id: OrgId,
        user: NewUser,
        roles: &[RoleName],
    ) -> CeoResult<(User, Vec<RoleName>)> {
        debug!("Inviting {} to organization {}", user.email, org_id);

        let mut tx = self.pool.inner().begin().await?;

        let user = NewUser {
            org_id: Some(org_id),
            active: false,
            ..user
        };
        let user = insert_user(&mut tx, &user).await?;

        let assigned: Vec<String> = sqlx::query_scalar(
            r#"
            WITH inserted AS (
                INSERT INTO user_roles (user_id, role_id, org_id)
                SELECT $1, r.id, $2 FROM roles r WHERE r.name = ANY($3)
                RETURNING role_id
            )
            SELECT r.name FROM inserted i JOIN roles r ON r.id = i.role_id
            "#,
        )
        .bind(user.id)
        .bind(org_id)
        .bind(role_names(roles))
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let assigned = roles
            .iter()
            .copied()
            .filter(|r| assigned.iter().any(|a| a == r.as_str()))
            .collect();

        Ok((user, assigned))
    }

    async fn find_by_id(&self, id: OrgId) -> CeoResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            "SELECT id, name, email, settings, created_at, updated_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Organization::from))
    }

    async fn list_ids(&self) -> CeoResult<Vec<OrgId>> {
        let ids: Vec<i32> = sqlx::query_scalar("SELECT id FROM organizations ORDER BY id")
            .fetch_all(self.pool.inner())
            .await?;

        Ok(ids.into_iter().map(OrgId).collect())
    }
}

impl std::fmt::Debug for PgOrganizationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgOrganizationRepository").finish_non_exhaustive()
    }
}
