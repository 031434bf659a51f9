//! Postgres dashboard queries.

use crate::{traits::DashboardRepository, DatabasePoolInterface};
use async_trait::async_trait;
use ceo_core::{
    ActivityItem, CeoResult, HourlyActivity, MetricsCounts, OrgId, OrgMetrics, Page, PageRequest,
    PerformanceStats, ReportStats, TeamMemberStats, TemplateDistribution, TimelinePoint, TrendPoint,
    UserId, UserStats,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use std::sync::Arc;
use tracing::debug;

/// Hours between submission and review.
const REVIEW_HOURS: &str = "EXTRACT(EPOCH FROM (review_date - submission_date)) / 3600";

/// Postgres dashboard repository implementation.
#[derive(Clone)]
pub struct PgDashboardRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgDashboardRepository {
    /// Creates a new Postgres dashboard repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardRepository for PgDashboardRepository {
    async fn latest_metrics(&self, org_id: OrgId) -> CeoResult<Option<serde_json::Value>> {
        let metrics: Option<serde_json::Value> = sqlx::query_scalar(
            r#"
            SELECT metrics_data FROM org_metrics
            WHERE org_id = $1
            ORDER BY calculated_at DESC
            LIMIT 1
            "#,
        )
        .bind(org_id)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(metrics)
    }

    async fn user_stats(&self, org_id: OrgId) -> CeoResult<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT COUNT(*) AS total_users,
                   COUNT(*) FILTER (WHERE active) AS active_users,
                   COUNT(*) FILTER (WHERE last_login > NOW() - INTERVAL '7 days') AS recently_active
            FROM users
            WHERE org_id = $1
            "#,
        )
        .bind(org_id)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(stats)
    }

    async fn report_stats(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<ReportStats> {
        let stats = sqlx::query_as::<_, ReportStats>(
            r#"
            SELECT COUNT(*) AS total_reports,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending_reports,
                   COUNT(*) FILTER (WHERE status = 'approved') AS approved_reports,
                   COUNT(*) FILTER (WHERE status = 'rejected') AS rejected_reports
            FROM submitted_reports
            WHERE org_id = $1 AND submission_date >= $2
            "#,
        )
        .bind(org_id)
        .bind(since)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(stats)
    }

    async fn trends(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<Vec<TrendPoint>> {
        let points = sqlx::query_as::<_, TrendPoint>(
            r#"
            SELECT (submission_date AT TIME ZONE 'UTC')::date AS date,
                   COUNT(*) AS submissions,
                   COUNT(*) FILTER (WHERE status = 'approved') AS approvals
            FROM submitted_reports
            WHERE org_id = $1 AND submission_date >= $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(org_id)
        .bind(since)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(points)
    }

    async fn activity(&self, org_id: OrgId, page: PageRequest) -> CeoResult<Page<ActivityItem>> {
        debug!("Loading activity feed of organization {}, page: {}", org_id, page.page);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT (SELECT COUNT(*) FROM submitted_reports WHERE org_id = $1)
                 + (SELECT COUNT(*)
                    FROM report_comments c
                    JOIN submitted_reports sr ON sr.id = c.report_id
                    WHERE sr.org_id = $1)
            "#,
        )
        .bind(org_id)
        .fetch_one(self.pool.inner())
        .await?;

        let items = sqlx::query_as::<_, ActivityItem>(
            r#"
            SELECT activity_type, id, created_at, user_name, template_name, detail
            FROM (
                SELECT 'report_submission'::text AS activity_type, sr.id,
                       sr.submission_date AS created_at, u.name AS user_name,
                       rt.name AS template_name, sr.status::text AS detail
                FROM submitted_reports sr
                JOIN users u ON u.id = sr.submitted_by
                JOIN report_templates rt ON rt.id = sr.template_id
                WHERE sr.org_id = $1
                UNION ALL
                SELECT 'comment'::text, c.id, c.created_at, u.name, rt.name, c.comment
                FROM report_comments c
                JOIN submitted_reports sr ON sr.id = c.report_id
                JOIN users u ON u.id = c.user_id
                JOIN report_templates rt ON rt.id = sr.template_id
                WHERE sr.org_id = $1
            ) activity
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(org_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool.inner())
        .await?;

        Ok(Page::new(items, page, u64::try_from(total).unwrap_or_default()))
    }

    async fn performance_stats(&self, org_id: OrgId, user_id: UserId, since: DateTime<Utc>) -> CeoResult<PerformanceStats> {
        let sql = format!(
            r#"
            SELECT COUNT(*) AS total_reports,
                   COUNT(*) FILTER (WHERE status = 'approved') AS approved_reports,
                   COUNT(*) FILTER (WHERE status = 'rejected') AS rejected_reports,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending_reports,
                   (AVG({REVIEW_HOURS}) FILTER (WHERE review_date IS NOT NULL))::float8 AS avg_review_time
            FROM submitted_reports
            WHERE org_id = $1 AND submitted_by = $2 AND submission_date >= $3
            "#
        );
        let stats = sqlx::query_as::<_, PerformanceStats>(&sql)
            .bind(org_id)
            .bind(user_id)
            .bind(since)
            .fetch_one(self.pool.inner())
            .await?;

        Ok(stats)
    }

    async fn performance_timeline(&self, org_id: OrgId, user_id: UserId, since: DateTime<Utc>) -> CeoResult<Vec<TimelinePoint>> {
        let points = sqlx::query_as::<_, TimelinePoint>(
            r#"
            SELECT (submission_date AT TIME ZONE 'UTC')::date AS date, COUNT(*) AS submissions
            FROM submitted_reports
            WHERE org_id = $1 AND submitted_by = $2 AND submission_date >= $3
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .bind(since)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(points)
    }

    async fn report_types(&self, org_id: OrgId, user_id: UserId, since: DateTime<Utc>) -> CeoResult<Vec<TemplateDistribution>> {
        let types = sqlx::query_as::<_, TemplateDistribution>(
            r#"
            SELECT rt.name AS template_name, COUNT(*) AS count
            FROM submitted_reports sr
            JOIN report_templates rt ON rt.id = sr.template_id
            WHERE sr.org_id = $1 AND sr.submitted_by = $2 AND sr.submission_date >= $3
            GROUP BY rt.name
            ORDER BY count DESC, rt.name
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .bind(since)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(types)
    }

    async fn team_stats(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<Vec<TeamMemberStats>> {
        let members = sqlx::query_as::<_, TeamMemberStats>(
            r#"
            SELECT u.id AS user_id, u.name, u.email,
                   COUNT(DISTINCT sr.id) AS total_reports,
                   COUNT(DISTINCT sr.id) FILTER (WHERE sr.status = 'approved') AS approved_reports,
                   COUNT(DISTINCT c.id) AS comments,
                   GREATEST(MAX(sr.submission_date), MAX(c.created_at)) AS last_activity
            FROM users u
            LEFT JOIN submitted_reports sr
                   ON sr.submitted_by = u.id AND sr.org_id = $1 AND sr.submission_date >= $2
            LEFT JOIN report_comments c
                   ON c.user_id = u.id AND c.created_at >= $2
            WHERE u.org_id = $1
            GROUP BY u.id
            ORDER BY total_reports DESC, u.name
            "#,
        )
        .bind(org_id)
        .bind(since)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(members)
    }

    async fn activity_by_hour(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<Vec<HourlyActivity>> {
        let hours = sqlx::query_as::<_, HourlyActivity>(
            r#"
            SELECT EXTRACT(HOUR FROM created_at AT TIME ZONE 'UTC')::int AS hour,
                   COUNT(*) AS activity_count
            FROM (
                SELECT submission_date AS created_at
                FROM submitted_reports
                WHERE org_id = $1 AND submission_date >= $2
                UNION ALL
                SELECT c.created_at
                FROM report_comments c
                JOIN submitted_reports sr ON sr.id = c.report_id
                WHERE sr.org_id = $1 AND c.created_at >= $2
            ) activity
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(org_id)
        .bind(since)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(hours)
    }

    async fn metrics_counts(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<MetricsCounts> {
        let sql = format!(
            r#"
            SELECT COUNT(*) AS total_reports,
                   COUNT(*) FILTER (WHERE status = 'approved') AS approved_reports,
                   (AVG({REVIEW_HOURS}) FILTER (WHERE review_date IS NOT NULL))::float8 AS average_review_hours,
                   COUNT(DISTINCT submitted_by) AS active_users
            FROM submitted_reports
            WHERE org_id = $1 AND submission_date >= $2
            "#
        );
        let counts = sqlx::query_as::<_, MetricsCounts>(&sql)
            .bind(org_id)
            .bind(since)
            .fetch_one(self.pool.inner())
            .await?;

        Ok(counts)
    }

    async fn store_metrics(&self, org_id: OrgId, metrics: &OrgMetrics) -> CeoResult<()> {
        debug!("Storing metrics for organization {}", org_id);

        sqlx::query("INSERT INTO org_metrics (org_id, metrics_data) VALUES ($1, $2)")
            .bind(org_id)
            .bind(Json(metrics))
            .execute(self.pool.inner())
            .await?;

        Ok(())
    }
}

impl std::fmt::Debug for PgDashboardRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDashboardRepository").finish_non_exhaustive()
    }
}
