//! Dashboard read models and organization metrics.

use crate::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot stored in `org_metrics.metrics_data` by the metrics job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OrgMetrics {
    pub total_reports: i64,
    /// Percentage of reports approved, 0 when nothing was submitted.
    pub report_completion: f64,
    /// Mean hours between submission and review.
    pub average_review_time: f64,
    pub active_users: i64,
}

impl OrgMetrics {
    /// Builds a snapshot from raw 30-day counts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(
        total_reports: i64,
        approved_reports: i64,
        average_review_hours: Option<f64>,
        active_users: i64,
    ) -> Self {
        let report_completion = if total_reports > 0 {
            approved_reports as f64 / total_reports as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total_reports,
            report_completion,
            average_review_time: average_review_hours.unwrap_or(0.0),
            active_users,
        }
    }
}

/// Raw counts the metrics job aggregates per organization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MetricsCounts {
    pub total_reports: i64,
    pub approved_reports: i64,
    pub average_review_hours: Option<f64>,
    pub active_users: i64,
}

impl From<MetricsCounts> for OrgMetrics {
    fn from(counts: MetricsCounts) -> Self {
        Self::from_counts(
            counts.total_reports,
            counts.approved_reports,
            counts.average_review_hours,
            counts.active_users,
        )
    }
}

/// Membership counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    /// Users who logged in during the last 7 days.
    pub recently_active: i64,
}

/// Report counters over the last 30 days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportStats {
    pub total_reports: i64,
    pub pending_reports: i64,
    pub approved_reports: i64,
    pub rejected_reports: i64,
}

/// Submissions and approvals on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub submissions: i64,
    pub approvals: i64,
}

/// Organization landing dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DashboardOverview {
    /// Latest metrics snapshot, `{}` before the first run.
    pub metrics: serde_json::Value,
    pub user_stats: UserStats,
    pub report_stats: ReportStats,
    pub trends: Vec<TrendPoint>,
}

/// One entry of the organization activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ActivityItem {
    /// `report_submission` or `comment`.
    pub activity_type: String,
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub template_name: Option<String>,
    pub detail: Option<String>,
}

/// Thirty-day counters for one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PerformanceStats {
    pub total_reports: i64,
    pub approved_reports: i64,
    pub rejected_reports: i64,
    pub pending_reports: i64,
    /// Mean hours to review, `None` when nothing was reviewed.
    pub avg_review_time: Option<f64>,
}

/// Submissions on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub submissions: i64,
}

/// Submission count per template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TemplateDistribution {
    pub template_name: String,
    pub count: i64,
}

/// A member's performance page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserPerformance {
    pub user_id: UserId,
    pub stats: PerformanceStats,
    pub timeline: Vec<TimelinePoint>,
    pub report_types: Vec<TemplateDistribution>,
}

/// Per-member totals on the team page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TeamMemberStats {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub total_reports: i64,
    pub approved_reports: i64,
    pub comments: i64,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Activity count for an hour of the day (0-23).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HourlyActivity {
    pub hour: i32,
    pub activity_count: i64,
}

/// Team overview for managers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TeamOverview {
    pub members: Vec<TeamMemberStats>,
    pub activity_by_hour: Vec<HourlyActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate() {
        let metrics = OrgMetrics::from_counts(8, 6, Some(12.5), 3);
        assert!((metrics.report_completion - 75.0).abs() < f64::EPSILON);
        assert!((metrics.average_review_time - 12.5).abs() < f64::EPSILON);
        assert_eq!(metrics.active_users, 3);
    }

    #[test]
    fn test_completion_rate_without_reports() {
        let metrics = OrgMetrics::from(MetricsCounts::default());
        assert_eq!(metrics.total_reports, 0);
        assert!(metrics.report_completion.abs() < f64::EPSILON);
        assert!(metrics.average_review_time.abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_json_keys() {
        let json = serde_json::to_value(OrgMetrics::from_counts(1, 1, None, 1)).unwrap();
        assert!(json.get("totalReports").is_some());
        assert!(json.get("reportCompletion").is_some());
        assert!(json.get("averageReviewTime").is_some());
        assert!(json.get("activeUsers").is_some());
    }
}
