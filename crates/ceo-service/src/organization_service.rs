//! Organization service implementation.
//!
//! Registration creates the organization and its CEO in one transaction;
//! invitations create an inactive member that activates itself by
//! accepting the emailed token.

use crate::auth_service::subject_for;
use crate::dto::{
    AcceptInvitationRequest, InviteMemberRequest, InviteMemberResponse, MemberSummary,
    MessageResponse, OrganizationResponse, OrganizationSummary, RegisterOrganizationRequest,
    RegisterOrganizationResponse, UserResponse,
};
use crate::Mailer;
use ceo_core::{CeoError, CeoResult, Interface, NewUser, RoleName, ValidateExt};
use ceo_repository::{OrganizationRepository, UserRepository};
use ceo_security::{
    generate_token, Claims, ClaimsExt, PasswordHasherInterface, TokenProviderInterface,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Organization service trait.
#[async_trait]
pub trait OrganizationService: Interface + Send + Sync {
    /// Creates an organization and its CEO account.
    async fn register(&self, request: RegisterOrganizationRequest) -> CeoResult<RegisterOrganizationResponse>;

    /// Invites a member into the caller's organization. CEO only.
    async fn invite(&self, claims: &Claims, request: InviteMemberRequest) -> CeoResult<InviteMemberResponse>;

    /// Activates an invited member.
    async fn accept_invitation(&self, request: AcceptInvitationRequest) -> CeoResult<MessageResponse>;

    /// The caller's organization.
    async fn current(&self, claims: &Claims) -> CeoResult<OrganizationResponse>;
}

/// Organization service implementation.
pub struct OrganizationServiceImpl {
    organizations: Arc<dyn OrganizationRepository>,
    users: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasherInterface>,
    token_provider: Arc<dyn TokenProviderInterface>,
    mailer: Mailer,
}

impl OrganizationServiceImpl {
    /// Creates a new organization service.
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        users: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasherInterface>,
        token_provider: Arc<dyn TokenProviderInterface>,
        mailer: Mailer,
    ) -> Self {
        Self {
            organizations,
            users,
            password_hasher,
            token_provider,
            mailer,
        }
    }
}

#[async_trait]
impl OrganizationService for OrganizationServiceImpl {
    async fn register(&self, request: RegisterOrganizationRequest) -> CeoResult<RegisterOrganizationResponse> {
        debug!("Registering organization '{}' for {}", request.org_name, request.email);

        request.validate_request()?;

        if self.users.exists_by_email(&request.email).await? {
            return Err(CeoError::conflict("Email already registered"));
        }

        let password_hash = self.password_hasher.hash(&request.password)?;
        let verification_token = generate_token();

        let (organization, user) = self
            .organizations
            .create_with_owner(
                &request.org_name,
                NewUser {
                    name: request.name,
                    email: request.email,
                    password_hash: Some(password_hash),
                    role: Some(RoleName::Ceo),
                    org_id: None,
                    active: true,
                    verification_token: Some(verification_token.clone()),
                    invitation_token: None,
                },
            )
            .await?;

        info!(org_id = %organization.id, user_id = %user.id, "Organization registered");

        let roles = vec![RoleName::Ceo];
        let issued = self.token_provider.generate_token(&subject_for(&user, roles.clone()))?;

        let message = self.mailer.templates().verification(&verification_token);
        self.mailer.send(&user.email, message).await;

        Ok(RegisterOrganizationResponse {
            organization: OrganizationSummary::from(&organization),
            user: MemberSummary {
                id: user.id,
                name: user.name,
                email: user.email,
                roles,
            },
            token: issued.token,
        })
    }

    async fn invite(&self, claims: &Claims, request: InviteMemberRequest) -> CeoResult<InviteMemberResponse> {
        claims.require_any_role(&[RoleName::Ceo])?;
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, "Inviting {}", request.email);

        request.validate_request()?;

        if self.users.exists_by_email(&request.email).await? {
            return Err(CeoError::conflict("Email already registered"));
        }

        let roles: Vec<RoleName> = request
            .roles
            .iter()
            .filter_map(|name| match name.parse::<RoleName>() {
                Ok(role) => Some(role),
                Err(e) => {
                    debug!("Skipping {}", e);
                    None
                }
            })
            .collect();

        let invitation_token = generate_token();
        let (user, assigned) = self
            .organizations
            .invite_member(
                org_id,
                NewUser {
                    name: request.name,
                    email: request.email,
                    password_hash: None,
                    role: None,
                    org_id: Some(org_id),
                    active: false,
                    verification_token: None,
                    invitation_token: Some(invitation_token.clone()),
                },
                &roles,
            )
            .await?;

        info!(org_id = %org_id, user_id = %user.id, invited_by = %claims.user_id, "Member invited");

        let org_name = self
            .organizations
            .find_by_id(org_id)
            .await?
            .map(|org| org.name)
            .unwrap_or_default();
        let message = self
            .mailer
            .templates()
            .team_invitation(&claims.name, &org_name, &invitation_token);
        self.mailer.send(&user.email, message).await;

        Ok(InviteMemberResponse {
            message: "User invited successfully".to_string(),
            user: MemberSummary {
                id: user.id,
                name: user.name,
                email: user.email,
                roles: assigned,
            },
        })
    }

    async fn accept_invitation(&self, request: AcceptInvitationRequest) -> CeoResult<MessageResponse> {
        debug!("Accepting invitation");

        request.validate_request()?;

        let password_hash = self.password_hasher.hash(&request.password)?;
        let user = self
            .users
            .accept_invitation(&request.token, &password_hash)
            .await?
            .ok_or_else(|| CeoError::validation("Invalid or expired invitation token"))?;

        info!(user_id = %user.id, "Invitation accepted");

        let message = self.mailer.templates().welcome(&user.name);
        self.mailer.send(&user.email, message).await;

        Ok(MessageResponse::new("Invitation accepted. You can now log in."))
    }

    async fn current(&self, claims: &Claims) -> CeoResult<OrganizationResponse> {
        let org_id = claims.require_org()?;

        let organization = self
            .organizations
            .find_by_id(org_id)
            .await?
            .ok_or_else(|| CeoError::not_found("Organization", org_id))?;
        let member = self
            .users
            .find_member(claims.user_id, org_id)
            .await?
            .ok_or_else(|| CeoError::not_found("User", claims.user_id))?;

        Ok(OrganizationResponse {
            organization,
            member: UserResponse::from(member),
        })
    }
}

impl std::fmt::Debug for OrganizationServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationServiceImpl").finish_non_exhaustive()
    }
}
