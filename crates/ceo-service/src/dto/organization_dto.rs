//! Organization-related DTOs.

use super::UserResponse;
use ceo_core::{OrgId, Organization, RoleName, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Creates an organization together with its CEO account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterOrganizationRequest {
    #[validate(length(min = 1, max = 255, message = "Organization name is required"))]
    pub org_name: String,

    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Organization summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationSummary {
    pub id: OrgId,
    pub name: String,
}

impl From<&Organization> for OrganizationSummary {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.clone(),
        }
    }
}

/// A member as returned from registration and invitation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleName>,
}

/// Response to organization registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterOrganizationResponse {
    pub organization: OrganizationSummary,
    pub user: MemberSummary,
    pub token: String,
}

/// Invites a member into the caller's organization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct InviteMemberRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Role names; names that match no role are skipped.
    #[validate(length(min = 1, message = "At least one role is required"))]
    pub roles: Vec<String>,
}

/// Response to an invitation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteMemberResponse {
    pub message: String,
    pub user: MemberSummary,
}

/// Sets the password of an invited member.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// The caller's organization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponse {
    pub organization: Organization,
    pub member: UserResponse,
}
