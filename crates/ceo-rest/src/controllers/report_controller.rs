//! Report templates, submissions, reviews and comments.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery, ValidatedJson},
    responses::{created, ok, ApiResult, CreatedResult},
    state::AppState,
};
use ceo_core::{ErrorResponse, ReportComment, ReportId, ReportTemplate, SubmittedReport};
use ceo_service::{
    AddCommentRequest, CreateTemplateRequest, ReportDetailResponse, ReportFilter,
    ReportListResponse, ReviewReportRequest, SubmitReportRequest,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Router,
};
use tracing::debug;

/// Creates the report router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/templates", post(create_template).get(list_templates))
        .route("/submit", post(submit_report))
        .route("/", get(list_reports))
        .route("/:id", get(get_report))
        .route("/:id/review", put(review_report))
        .route("/:id/comments", post(add_comment))
}

/// Create a report template. CEO or project manager.
#[utoipa::path(
    post,
    path = "/api/reports/templates",
    tag = "reports",
    security(("bearer_auth" = [])),
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = ReportTemplate),
        (status = 403, description = "Caller cannot manage templates", body = ErrorResponse)
    )
)]
pub async fn create_template(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateTemplateRequest>,
) -> CreatedResult<ReportTemplate> {
    debug!("Create template request from {}: {}", user.user_id, request.name);

    let template = state.report_service.create_template(&user.0, request).await?;
    created(template)
}

/// Templates of the caller's organization, newest first.
#[utoipa::path(
    get,
    path = "/api/reports/templates",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Templates", body = [ReportTemplate])
    )
)]
pub async fn list_templates(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Vec<ReportTemplate>> {
    debug!("List templates request from: {}", user.user_id);

    let templates = state.report_service.list_templates(&user.0).await?;
    ok(templates)
}

/// Submit a filled-in template.
#[utoipa::path(
    post,
    path = "/api/reports/submit",
    tag = "reports",
    security(("bearer_auth" = [])),
    request_body = SubmitReportRequest,
    responses(
        (status = 201, description = "Report submitted", body = SubmittedReport),
        (status = 404, description = "Template not found in the organization", body = ErrorResponse)
    )
)]
pub async fn submit_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<SubmitReportRequest>,
) -> CreatedResult<SubmittedReport> {
    debug!("Submit report request from {} for template {}", user.user_id, request.template_id);

    let report = state.report_service.submit(&user.0, request).await?;
    created(report)
}

/// Reports of the caller's organization.
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "pending, approved or rejected"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Reports", body = ReportListResponse)
    )
)]
pub async fn list_reports(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<ReportFilter>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<ReportListResponse> {
    debug!("List reports request from {} (status: {:?})", user.user_id, filter.status);

    let response = state
        .report_service
        .list_reports(&user.0, filter, pagination.into())
        .await?;
    ok(response)
}

/// A report with its comments.
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = ReportDetailResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn get_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<ReportDetailResponse> {
    debug!("Get report request: {}", id);

    let id: ReportId = parse_id("report", &id)?;
    let response = state.report_service.get_report(&user.0, id).await?;
    ok(response)
}

/// Approve or reject a report. CEO or project manager.
#[utoipa::path(
    put,
    path = "/api/reports/{id}/review",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    request_body = ReviewReportRequest,
    responses(
        (status = 200, description = "Report reviewed", body = SubmittedReport),
        (status = 400, description = "Status is not approved or rejected", body = ErrorResponse),
        (status = 403, description = "Caller cannot review", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn review_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ReviewReportRequest>,
) -> ApiResult<SubmittedReport> {
    debug!("Review request for report {}: {:?}", id, request.status);

    let id: ReportId = parse_id("report", &id)?;
    let report = state.report_service.review(&user.0, id, request).await?;
    ok(report)
}

/// Comment on a report.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/comments",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = ReportComment),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddCommentRequest>,
) -> CreatedResult<ReportComment> {
    debug!("Comment on report {} from {}", id, user.user_id);

    let id: ReportId = parse_id("report", &id)?;
    let comment = state.report_service.add_comment(&user.0, id, request).await?;
    created(comment)
}
