//! Report templates, submissions and comments.

use crate::{CommentId, OrgId, ReportId, TemplateId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a template expects a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReportFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Custom,
}

impl ReportFrequency {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Custom => "custom",
        }
    }

    /// Days that must pass after the last submission before a reminder is sent.
    ///
    /// `None` for custom cadences, which have no fixed interval.
    #[must_use]
    pub const fn reminder_interval_days(&self) -> Option<i64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Monthly => Some(30),
            Self::Quarterly => Some(90),
            Self::Custom => None,
        }
    }

    /// Whether a reminder is due given the last submission time.
    ///
    /// A template that was never submitted is always due, whatever its cadence.
    /// Once submitted, a custom cadence is never reminded.
    #[must_use]
    pub fn reminder_due(&self, last_submission: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last) = last_submission else {
            return true;
        };
        self.reminder_interval_days()
            .is_some_and(|interval| (now - last).num_days() >= interval)
    }
}

impl fmt::Display for ReportFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown report frequency: {other}")),
        }
    }
}

/// Review state of a submitted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether a reviewer may set this status.
    #[must_use]
    pub const fn is_review_outcome(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

/// A form definition that members fill in periodically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportTemplate {
    pub id: TemplateId,
    pub org_id: OrgId,
    pub name: String,
    pub description: Option<String>,
    /// Field definitions, stored as JSON.
    pub fields: serde_json::Value,
    pub required_frequency: Option<ReportFrequency>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a template.
#[derive(Debug, Clone)]
pub struct NewReportTemplate {
    pub org_id: OrgId,
    pub name: String,
    pub description: Option<String>,
    pub fields: serde_json::Value,
    pub required_frequency: Option<ReportFrequency>,
    pub created_by: UserId,
}

/// A filled-in template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubmittedReport {
    pub id: ReportId,
    pub template_id: TemplateId,
    pub org_id: OrgId,
    pub submitted_by: UserId,
    pub report_data: serde_json::Value,
    pub status: ReportStatus,
    pub reviewed_by: Option<UserId>,
    pub review_notes: Option<String>,
    pub submission_date: DateTime<Utc>,
    pub review_date: Option<DateTime<Utc>>,
    pub reporting_period_start: Option<NaiveDate>,
    pub reporting_period_end: Option<NaiveDate>,
}

/// Fields needed to insert a submission.
#[derive(Debug, Clone)]
pub struct NewSubmittedReport {
    pub template_id: TemplateId,
    pub org_id: OrgId,
    pub submitted_by: UserId,
    pub report_data: serde_json::Value,
    pub reporting_period_start: Option<NaiveDate>,
    pub reporting_period_end: Option<NaiveDate>,
}

/// A submission joined with its template and people.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportSummary {
    #[serde(flatten)]
    pub report: SubmittedReport,
    pub template_name: String,
    pub submitter_name: String,
    pub submitter_email: String,
    pub reviewer_name: Option<String>,
}

/// A comment on a report with its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportComment {
    pub id: CommentId,
    pub report_id: ReportId,
    pub user_id: UserId,
    pub user_name: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A template with a cadence and one member who should submit it.
#[derive(Debug, Clone)]
pub struct ReminderCandidate {
    pub template_id: TemplateId,
    pub template_name: String,
    pub frequency: ReportFrequency,
    pub org_id: OrgId,
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub whatsapp_number: Option<String>,
    pub last_submission: Option<DateTime<Utc>>,
}
