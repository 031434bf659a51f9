//! User entity.

use super::notification::NotificationPreferences;
use super::role::RoleName;
use crate::{OrgId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account.
///
/// Members of an organization get their roles from `user_roles`; accounts
/// created through the standalone registration carry a single primary role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,

    /// Argon2 hash; absent for invited users who have not accepted yet.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Primary role for accounts outside an organization.
    pub role: Option<RoleName>,
    pub org_id: Option<OrgId>,
    pub phone_number: Option<String>,
    pub whatsapp_number: Option<String>,
    pub notification_preferences: NotificationPreferences,
    pub active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account is allowed to sign in.
    #[must_use]
    pub fn can_login(&self) -> bool {
        self.active && self.is_verified && self.password_hash.is_some()
    }
}

/// Fields needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Option<RoleName>,
    pub org_id: Option<OrgId>,
    pub active: bool,
    /// Token mailed for email verification.
    pub verification_token: Option<String>,
    /// Token mailed with a team invitation.
    pub invitation_token: Option<String>,
}

/// A user together with the roles held in their organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<RoleName>,
}

/// A recipient of an email or WhatsApp message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub whatsapp_number: Option<String>,
}

impl From<&User> for Contact {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            whatsapp_number: user.whatsapp_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId(1),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: Some("hash".into()),
            role: None,
            org_id: Some(OrgId(1)),
            phone_number: None,
            whatsapp_number: None,
            notification_preferences: NotificationPreferences::default(),
            active: true,
            is_verified: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_can_login() {
        assert!(user().can_login());

        let mut unverified = user();
        unverified.is_verified = false;
        assert!(!unverified.can_login());

        let mut invited = user();
        invited.active = false;
        invited.password_hash = None;
        assert!(!invited.can_login());
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
