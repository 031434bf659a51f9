//! Postgres report repository implementation.

use super::{role_names, user_repository::ContactRow};
use crate::{traits::ReportRepository, DatabasePoolInterface};
use async_trait::async_trait;
use ceo_core::{
    CeoError, CeoResult, CommentId, Contact, NewReportTemplate, NewSubmittedReport, OrgId, Page,
    PageRequest, ReminderCandidate, ReportComment, ReportFrequency, ReportId, ReportStatus,
    ReportSummary, ReportTemplate, RoleName, SubmittedReport, TemplateId, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

const REPORT_COLUMNS: &str = r#"
    sr.id, sr.template_id, sr.org_id, sr.submitted_by, sr.report_data, sr.status,
    sr.reviewed_by, sr.review_notes, sr.submission_date, sr.review_date,
    sr.reporting_period_start, sr.reporting_period_end
"#;

const SUMMARY_JOINS: &str = r#"
    FROM submitted_reports sr
    JOIN report_templates rt ON rt.id = sr.template_id
    JOIN users submitter ON submitter.id = sr.submitted_by
    LEFT JOIN users reviewer ON reviewer.id = sr.reviewed_by
"#;

const SUMMARY_EXTRA_COLUMNS: &str = r#"
    rt.name AS template_name, submitter.name AS submitter_name,
    submitter.email AS submitter_email, reviewer.name AS reviewer_name
"#;

/// Postgres report repository implementation.
#[derive(Clone)]
pub struct PgReportRepository {
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgReportRepository {
    /// Creates a new Postgres report repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

fn parse_frequency(value: Option<String>) -> Result<Option<ReportFrequency>, CeoError> {
    value
        .map(|v| v.parse().map_err(CeoError::Internal))
        .transpose()
}

#[derive(Debug, FromRow)]
struct TemplateRow {
    id: i32,
    org_id: i32,
    name: String,
    description: Option<String>,
    fields: serde_json::Value,
    required_frequency: Option<String>,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TemplateRow> for ReportTemplate {
    type Error = CeoError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        Ok(ReportTemplate {
            id: TemplateId(row.id),
            org_id: OrgId(row.org_id),
            name: row.name,
            description: row.description,
            fields: row.fields,
            required_frequency: parse_frequency(row.required_frequency)?,
            created_by: row.created_by.map(UserId),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReportRow {
    id: i32,
    template_id: i32,
    org_id: i32,
    submitted_by: i32,
    report_data: serde_json::Value,
    status: String,
    reviewed_by: Option<i32>,
    review_notes: Option<String>,
    submission_date: DateTime<Utc>,
    review_date: Option<DateTime<Utc>>,
    reporting_period_start: Option<NaiveDate>,
    reporting_period_end: Option<NaiveDate>,
}

impl TryFrom<ReportRow> for SubmittedReport {
    type Error = CeoError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        Ok(SubmittedReport {
            id: ReportId(row.id),
            template_id: TemplateId(row.template_id),
            org_id: OrgId(row.org_id),
            submitted_by: UserId(row.submitted_by),
            report_data: row.report_data,
            status: row.status.parse().map_err(CeoError::Internal)?,
            reviewed_by: row.reviewed_by.map(UserId),
            review_notes: row.review_notes,
            submission_date: row.submission_date,
            review_date: row.review_date,
            reporting_period_start: row.reporting_period_start,
            reporting_period_end: row.reporting_period_end,
        })
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    report: ReportRow,
    template_name: String,
    submitter_name: String,
    submitter_email: String,
    reviewer_name: Option<String>,
}

impl TryFrom<SummaryRow> for ReportSummary {
    type Error = CeoError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(ReportSummary {
            report: SubmittedReport::try_from(row.report)?,
            template_name: row.template_name,
            submitter_name: row.submitter_name,
            submitter_email: row.submitter_email,
            reviewer_name: row.reviewer_name,
        })
    }
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: i32,
    report_id: i32,
    user_id: i32,
    user_name: String,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for ReportComment {
    fn from(row: CommentRow) -> Self {
        ReportComment {
            id: CommentId(row.id),
            report_id: ReportId(row.report_id),
            user_id: UserId(row.user_id),
            user_name: row.user_name,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CandidateRow {
    template_id: i32,
    template_name: String,
    frequency: String,
    org_id: i32,
    user_id: i32,
    user_name: String,
    email: String,
    whatsapp_number: Option<String>,
    last_submission: Option<DateTime<Utc>>,
}

impl TryFrom<CandidateRow> for ReminderCandidate {
    type Error = CeoError;

    fn try_from(row: CandidateRow) -> Result<Self, Self::Error> {
        Ok(ReminderCandidate {
            template_id: TemplateId(row.template_id),
            template_name: row.template_name,
            frequency: row.frequency.parse().map_err(CeoError::Internal)?,
            org_id: OrgId(row.org_id),
            user_id: UserId(row.user_id),
            user_name: row.user_name,
            email: row.email,
            whatsapp_number: row.whatsapp_number,
            last_submission: row.last_submission,
        })
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create_template(&self, template: NewReportTemplate) -> CeoResult<ReportTemplate> {
        debug!("Creating report template '{}' in organization {}", template.name, template.org_id);

        let row = sqlx::query_as::<_, TemplateRow>(
            r#"
            INSERT INTO report_templates (org_id, name, description, fields, required_frequency, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, org_id, name, description, fields, required_frequency,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(template.org_id)
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.fields)
        .bind(template.required_frequency.map(|f| f.as_str()))
        .bind(template.created_by)
        .fetch_one(self.pool.inner())
        .await?;

        ReportTemplate::try_from(row)
    }

    async fn list_templates(&self, org_id: OrgId) -> CeoResult<Vec<ReportTemplate>> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT id, org_id, name, description, fields, required_frequency,
                   created_by, created_at, updated_at
            FROM report_templates
            WHERE org_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(org_id)
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(ReportTemplate::try_from).collect()
    }

    async fn find_template(&self, id: TemplateId, org_id: OrgId) -> CeoResult<Option<ReportTemplate>> {
        let row = sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT id, org_id, name, description, fields, required_frequency,
                   created_by, created_at, updated_at
            FROM report_templates
            WHERE id = $1 AND org_id = $2
            "#,
        )
        .bind(id)
        .bind(org_id)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(ReportTemplate::try_from).transpose()
    }

    async fn submit(&self, report: NewSubmittedReport) -> CeoResult<SubmittedReport> {
        debug!("Submitting report for template {}", report.template_id);

        let sql = format!(
            r#"
            INSERT INTO submitted_reports AS sr (template_id, org_id, submitted_by, report_data,
                                                 status, reporting_period_start, reporting_period_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(report.template_id)
            .bind(report.org_id)
            .bind(report.submitted_by)
            .bind(&report.report_data)
            .bind(ReportStatus::Pending.as_str())
            .bind(report.reporting_period_start)
            .bind(report.reporting_period_end)
            .fetch_one(self.pool.inner())
            .await?;

        SubmittedReport::try_from(row)
    }

    async fn find_report(&self, id: ReportId, org_id: OrgId) -> CeoResult<Option<ReportSummary>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS}, {SUMMARY_EXTRA_COLUMNS} {SUMMARY_JOINS} WHERE sr.id = $1 AND sr.org_id = $2"
        );
        let row = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(id)
            .bind(org_id)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(ReportSummary::try_from).transpose()
    }

    async fn list_reports(
        &self,
        org_id: OrgId,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> CeoResult<Page<ReportSummary>> {
        debug!("Listing reports of organization {}, page: {}, limit: {}", org_id, page.page, page.limit);

        let status = status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM submitted_reports WHERE org_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(org_id)
        .bind(status)
        .fetch_one(self.pool.inner())
        .await?;

        let sql = format!(
            r#"
            SELECT {REPORT_COLUMNS}, {SUMMARY_EXTRA_COLUMNS}
            {SUMMARY_JOINS}
            WHERE sr.org_id = $1 AND ($2::text IS NULL OR sr.status = $2)
            ORDER BY sr.submission_date DESC, sr.id DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(org_id)
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool.inner())
            .await?;

        let reports = rows
            .into_iter()
            .map(ReportSummary::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(reports, page, u64::try_from(total).unwrap_or_default()))
    }

    async fn review(
        &self,
        id: ReportId,
        org_id: OrgId,
        reviewer: UserId,
        status: ReportStatus,
        notes: Option<&str>,
    ) -> CeoResult<Option<SubmittedReport>> {
        debug!("Reviewing report {} as {}", id, status);

        let sql = format!(
            r#"
            UPDATE submitted_reports AS sr
            SET status = $1, reviewed_by = $2, review_notes = $3, review_date = NOW()
            WHERE sr.id = $4 AND sr.org_id = $5
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(status.as_str())
            .bind(reviewer)
            .bind(notes)
            .bind(id)
            .bind(org_id)
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(SubmittedReport::try_from).transpose()
    }

    async fn add_comment(&self, report_id: ReportId, user_id: UserId, comment: &str) -> CeoResult<ReportComment> {
        debug!("Adding comment to report {}", report_id);

        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO report_comments (report_id, user_id, comment)
                VALUES ($1, $2, $3)
                RETURNING id, report_id, user_id, comment, created_at
            )
            SELECT i.id, i.report_id, i.user_id, u.name AS user_name, i.comment, i.created_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(report_id)
        .bind(user_id)
        .bind(comment)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(ReportComment::from(row))
    }

    async fn list_comments(&self, report_id: ReportId) -> CeoResult<Vec<ReportComment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.report_id, c.user_id, u.name AS user_name, c.comment, c.created_at
            FROM report_comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.report_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(report_id)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(ReportComment::from).collect())
    }

    async fn comment_participants(&self, report_id: ReportId, exclude: UserId) -> CeoResult<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r#"
            SELECT u.id, u.name, u.email, u.whatsapp_number
            FROM users u
            WHERE u.id <> $2
              AND (
                u.id = (SELECT submitted_by FROM submitted_reports WHERE id = $1)
                OR u.id IN (SELECT user_id FROM report_comments WHERE report_id = $1)
              )
            ORDER BY u.id
            "#,
        )
        .bind(report_id)
        .bind(exclude)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn reminder_candidates(&self, roles: &[RoleName]) -> CeoResult<Vec<ReminderCandidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT rt.id AS template_id, rt.name AS template_name,
                   rt.required_frequency AS frequency, rt.org_id,
                   u.id AS user_id, u.name AS user_name, u.email, u.whatsapp_number,
                   (
                       SELECT MAX(sr.submission_date)
                       FROM submitted_reports sr
                       WHERE sr.template_id = rt.id
                   ) AS last_submission
            FROM report_templates rt
            JOIN users u ON u.org_id = rt.org_id AND u.active = TRUE
            WHERE rt.required_frequency IS NOT NULL
              AND EXISTS (
                  SELECT 1
                  FROM user_roles ur
                  JOIN roles r ON r.id = ur.role_id
                  WHERE ur.user_id = u.id AND ur.org_id = rt.org_id AND r.name = ANY($1)
              )
            ORDER BY rt.org_id, rt.id, u.id
            "#,
        )
        .bind(role_names(roles))
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(ReminderCandidate::try_from).collect()
    }
}

impl std::fmt::Debug for PgReportRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgReportRepository").finish_non_exhaustive()
    }
}
