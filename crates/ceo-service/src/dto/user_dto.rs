//! User-related DTOs.

use ceo_core::{
    Member, NotificationPreferences, OrgId, PageInfo, RoleName, User, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Standalone account creation with a primary role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Accounts created without a password cannot sign in until they reset it.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,

    pub role: RoleName,
}

/// User response DTO.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Primary role of accounts outside an organization.
    pub role: Option<RoleName>,
    pub roles: Vec<RoleName>,
    pub org_id: Option<OrgId>,
    pub phone_number: Option<String>,
    pub whatsapp_number: Option<String>,
    pub notification_preferences: NotificationPreferences,
    pub active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    /// Builds the response from a user and the roles held in their organization.
    #[must_use]
    pub fn with_roles(user: User, roles: Vec<RoleName>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            roles,
            org_id: user.org_id,
            phone_number: user.phone_number,
            whatsapp_number: user.whatsapp_number,
            notification_preferences: user.notification_preferences,
            active: user.active,
            is_verified: user.is_verified,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let roles = user.role.into_iter().collect();
        Self::with_roles(user, roles)
    }
}

impl From<Member> for UserResponse {
    fn from(member: Member) -> Self {
        Self::with_roles(member.user, member.roles)
    }
}

/// Response to a standalone account creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

/// Paginated organization members.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub pagination: PageInfo,
}
