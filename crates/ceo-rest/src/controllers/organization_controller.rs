//! Organization controller.

use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    responses::{created, ok, ApiResult, CreatedResult},
    state::AppState,
};
use ceo_core::ErrorResponse;
use ceo_service::{
    AcceptInvitationRequest, InviteMemberRequest, InviteMemberResponse, MessageResponse,
    OrganizationResponse, RegisterOrganizationRequest, RegisterOrganizationResponse,
};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::debug;

/// Creates the organization router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/invite", post(invite))
        .route("/accept-invite", post(accept_invitation))
        .route("/me", get(current))
}

/// Create an organization together with its CEO account.
#[utoipa::path(
    post,
    path = "/api/organizations/register",
    tag = "organizations",
    request_body = RegisterOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = RegisterOrganizationResponse),
        (status = 400, description = "Invalid input or email taken", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterOrganizationRequest>,
) -> CreatedResult<RegisterOrganizationResponse> {
    debug!("Organization registration: {}", request.org_name);

    let response = state.organization_service.register(request).await?;
    created(response)
}

/// Invite a member into the caller's organization. CEO only.
#[utoipa::path(
    post,
    path = "/api/organizations/invite",
    tag = "organizations",
    security(("bearer_auth" = [])),
    request_body = InviteMemberRequest,
    responses(
        (status = 201, description = "Invitation sent", body = InviteMemberResponse),
        (status = 400, description = "Invalid input or email taken", body = ErrorResponse),
        (status = 403, description = "Caller is not the CEO", body = ErrorResponse)
    )
)]
pub async fn invite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<InviteMemberRequest>,
) -> CreatedResult<InviteMemberResponse> {
    debug!("Invite request from {}: {}", user.user_id, request.email);

    let response = state.organization_service.invite(&user.0, request).await?;
    created(response)
}

/// Accept an invitation by choosing a password.
#[utoipa::path(
    post,
    path = "/api/organizations/accept-invite",
    tag = "organizations",
    request_body = AcceptInvitationRequest,
    responses(
        (status = 200, description = "Invitation accepted", body = MessageResponse),
        (status = 400, description = "Invalid invitation token", body = ErrorResponse)
    )
)]
pub async fn accept_invitation(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AcceptInvitationRequest>,
) -> ApiResult<MessageResponse> {
    debug!("Invitation acceptance");

    let response = state.organization_service.accept_invitation(request).await?;
    ok(response)
}

/// The caller's organization.
#[utoipa::path(
    get,
    path = "/api/organizations/me",
    tag = "organizations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Organization", body = OrganizationResponse),
        (status = 403, description = "Caller has no organization", body = ErrorResponse)
    )
)]
pub async fn current(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<OrganizationResponse> {
    debug!("Current organization request from: {}", user.user_id);

    let response = state.organization_service.current(&user.0).await?;
    ok(response)
}
