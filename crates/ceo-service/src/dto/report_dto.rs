//! Report-related DTOs.

use ceo_core::{
    PageInfo, ReportComment, ReportFrequency, ReportStatus, ReportSummary, TemplateId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Creates a report template.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 255, message = "Template name is required"))]
    pub name: String,

    pub description: Option<String>,

    /// Field definitions rendered by the frontend form builder.
    pub fields: serde_json::Value,

    pub required_frequency: Option<ReportFrequency>,
}

/// Submits a filled-in template.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitReportRequest {
    pub template_id: TemplateId,
    pub report_data: serde_json::Value,
    pub reporting_period_start: Option<NaiveDate>,
    pub reporting_period_end: Option<NaiveDate>,
}

/// Sets the review outcome.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewReportRequest {
    pub status: ReportStatus,

    #[validate(length(max = 5000))]
    pub review_notes: Option<String>,
}

/// Adds a comment to a report.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddCommentRequest {
    #[validate(custom(function = "ceo_core::rules::not_blank", message = "Comment is required"))]
    pub comment: String,
}

/// Filters for the report list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
}

/// Paginated reports.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportListResponse {
    pub reports: Vec<ReportSummary>,
    pub pagination: PageInfo,
}

/// A report with its discussion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportDetailResponse {
    #[serde(flatten)]
    pub report: ReportSummary,
    pub comments: Vec<ReportComment>,
}
