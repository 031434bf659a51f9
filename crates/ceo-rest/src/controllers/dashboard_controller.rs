//! Dashboard controller.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery},
    responses::{ok, ApiResult},
    state::AppState,
};
use ceo_core::{DashboardOverview, ErrorResponse, TeamOverview, UserId, UserPerformance};
use ceo_service::ActivityResponse;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use tracing::debug;

/// Creates the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(overview))
        .route("/activity", get(activity))
        .route("/performance/:user_id", get(performance))
        .route("/team", get(team))
}

/// Organization overview: metrics snapshot, user and report statistics, 30-day trend.
#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overview", body = DashboardOverview)
    )
)]
pub async fn overview(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<DashboardOverview> {
    debug!("Dashboard overview request from: {}", user.user_id);

    let response = state.dashboard_service.overview(&user.0).await?;
    ok(response)
}

/// Recent submissions and comments, newest first.
#[utoipa::path(
    get,
    path = "/api/dashboard/activity",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Activity feed", body = ActivityResponse)
    )
)]
pub async fn activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<ActivityResponse> {
    debug!("Dashboard activity request from: {}", user.user_id);

    let response = state.dashboard_service.activity(&user.0, pagination.into()).await?;
    ok(response)
}

/// Reporting performance of one member.
#[utoipa::path(
    get,
    path = "/api/dashboard/performance/{user_id}",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Performance", body = UserPerformance),
        (status = 403, description = "Not the caller and caller is not a manager", body = ErrorResponse),
        (status = 404, description = "User not in the organization", body = ErrorResponse)
    )
)]
pub async fn performance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> ApiResult<UserPerformance> {
    debug!("Performance request for {} from {}", user_id, user.user_id);

    let user_id: UserId = parse_id("user", &user_id)?;
    let response = state.dashboard_service.performance(&user.0, user_id).await?;
    ok(response)
}

/// Team statistics. CEO or project manager.
#[utoipa::path(
    get,
    path = "/api/dashboard/team",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Team overview", body = TeamOverview),
        (status = 403, description = "Caller is not a manager", body = ErrorResponse)
    )
)]
pub async fn team(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<TeamOverview> {
    debug!("Team overview request from: {}", user.user_id);

    let response = state.dashboard_service.team(&user.0).await?;
    ok(response)
}
