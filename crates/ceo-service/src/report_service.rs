//! Report service implementation.

use crate::dto::{
    AddCommentRequest, CreateTemplateRequest, ReportDetailResponse, ReportFilter,
    ReportListResponse, ReviewReportRequest, SubmitReportRequest,
};
use crate::Mailer;
use ceo_core::{
    CeoError, CeoResult, Interface, NewReportTemplate, NewSubmittedReport, PageRequest,
    ReportComment, ReportId, ReportTemplate, SubmittedReport, ValidateExt, MANAGER_ROLES,
};
use ceo_repository::{ReportRepository, UserRepository};
use ceo_security::{Claims, ClaimsExt};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Report service trait.
#[async_trait]
pub trait ReportService: Interface + Send + Sync {
    /// Creates a template in the caller's organization. CEO or project manager.
    async fn create_template(&self, claims: &Claims, request: CreateTemplateRequest) -> CeoResult<ReportTemplate>;

    /// Templates of the caller's organization.
    async fn list_templates(&self, claims: &Claims) -> CeoResult<Vec<ReportTemplate>>;

    /// Submits a report and notifies the managers.
    async fn submit(&self, claims: &Claims, request: SubmitReportRequest) -> CeoResult<SubmittedReport>;

    /// Lists reports of the caller's organization.
    async fn list_reports(
        &self,
        claims: &Claims,
        filter: ReportFilter,
        page: PageRequest,
    ) -> CeoResult<ReportListResponse>;

    /// A report with its comments.
    async fn get_report(&self, claims: &Claims, id: ReportId) -> CeoResult<ReportDetailResponse>;

    /// Approves or rejects a report. CEO or project manager.
    async fn review(&self, claims: &Claims, id: ReportId, request: ReviewReportRequest) -> CeoResult<SubmittedReport>;

    /// Comments on a report and notifies the discussion.
    async fn add_comment(&self, claims: &Claims, id: ReportId, request: AddCommentRequest) -> CeoResult<ReportComment>;
}

/// Report service implementation.
pub struct ReportServiceImpl {
    reports: Arc<dyn ReportRepository>,
    users: Arc<dyn UserRepository>,
    mailer: Mailer,
}

impl ReportServiceImpl {
    /// Creates a new report service.
    pub fn new(reports: Arc<dyn ReportRepository>, users: Arc<dyn UserRepository>, mailer: Mailer) -> Self {
        Self { reports, users, mailer }
    }
}

#[async_trait]
impl ReportService for ReportServiceImpl {
    async fn create_template(&self, claims: &Claims, request: CreateTemplateRequest) -> CeoResult<ReportTemplate> {
        claims.require_manager()?;
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, "Creating report template: {}", request.name);

        request.validate_request()?;

        let template = self
            .reports
            .create_template(NewReportTemplate {
                org_id,
                name: request.name,
                description: request.description,
                fields: request.fields,
                required_frequency: request.required_frequency,
                created_by: claims.user_id,
            })
            .await?;

        info!(org_id = %org_id, template_id = %template.id, "Report template created");
        Ok(template)
    }

    async fn list_templates(&self, claims: &Claims) -> CeoResult<Vec<ReportTemplate>> {
        let org_id = claims.require_org()?;
        self.reports.list_templates(org_id).await
    }

    async fn submit(&self, claims: &Claims, request: SubmitReportRequest) -> CeoResult<SubmittedReport> {
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, template_id = %request.template_id, "Submitting report");

        request.validate_request()?;

        let template = self
            .reports
            .find_template(request.template_id, org_id)
            .await?
            .ok_or_else(|| CeoError::not_found("Report template", request.template_id))?;

        let report = self
            .reports
            .submit(NewSubmittedReport {
                template_id: template.id,
                org_id,
                submitted_by: claims.user_id,
                report_data: request.report_data,
                reporting_period_start: request.reporting_period_start,
                reporting_period_end: request.reporting_period_end,
            })
            .await?;

        info!(org_id = %org_id, report_id = %report.id, user_id = %claims.user_id, "Report submitted");

        let managers = self.users.find_contacts_by_roles(org_id, &MANAGER_ROLES).await?;
        let message = self
            .mailer
            .templates()
            .report_submission(report.id, &claims.name, &template.name);
        let recipients: Vec<&str> = managers.iter().map(|m| m.email.as_str()).collect();
        self.mailer
            .send_all(recipients, &message)
            .await;

        Ok(report)
    }

    async fn list_reports(
        &self,
        claims: &Claims,
        filter: ReportFilter,
        page: PageRequest,
    ) -> CeoResult<ReportListResponse> {
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, "Listing reports, page: {}, limit: {}", page.page, page.limit);

        let reports = self.reports.list_reports(org_id, filter.status, page).await?;
        Ok(ReportListResponse {
            reports: reports.items,
            pagination: reports.pagination,
        })
    }

    async fn get_report(&self, claims: &Claims, id: ReportId) -> CeoResult<ReportDetailResponse> {
        let org_id = claims.require_org()?;

        let report = self
            .reports
            .find_report(id, org_id)
            .await?
            .ok_or_else(|| CeoError::not_found("Report", id))?;
        let comments = self.reports.list_comments(id).await?;

        Ok(ReportDetailResponse { report, comments })
    }

    async fn review(&self, claims: &Claims, id: ReportId, request: ReviewReportRequest) -> CeoResult<SubmittedReport> {
        claims.require_manager()?;
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, report_id = %id, "Reviewing report");

        request.validate_request()?;
        if !request.status.is_review_outcome() {
            return Err(CeoError::validation("Status must be approved or rejected"));
        }

        let report = self
            .reports
            .review(id, org_id, claims.user_id, request.status, request.review_notes.as_deref())
            .await?
            .ok_or_else(|| CeoError::not_found("Report", id))?;

        info!(report_id = %id, status = %report.status, reviewer = %claims.user_id, "Report reviewed");

        if let Some(submitter) = self.users.find_by_id(report.submitted_by).await? {
            let message = self.mailer.templates().report_reviewed(
                report.id,
                report.status,
                &claims.name,
                report.review_notes.as_deref(),
            );
            self.mailer.send(&submitter.email, message).await;
        }

        Ok(report)
    }

    async fn add_comment(&self, claims: &Claims, id: ReportId, request: AddCommentRequest) -> CeoResult<ReportComment> {
        let org_id = claims.require_org()?;
        debug!(org_id = %org_id, report_id = %id, "Adding comment");

        request.validate_request()?;

        if self.reports.find_report(id, org_id).await?.is_none() {
            return Err(CeoError::not_found("Report", id));
        }

        let comment = self.reports.add_comment(id, claims.user_id, &request.comment).await?;

        let participants = self.reports.comment_participants(id, claims.user_id).await?;
        let message = self
            .mailer
            .templates()
            .report_comment(id, &claims.name, &comment.comment);
        let recipients: Vec<&str> = participants.iter().map(|p| p.email.as_str()).collect();
        self.mailer
            .send_all(recipients, &message)
            .await;

        Ok(comment)
    }
}

impl std::fmt::Debug for ReportServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{claims, MemoryStore, RecordingEmail};
    use ceo_core::{OrgId, ReportFrequency, ReportStatus, RoleName, TemplateId, User};
    use ceo_notify::EmailTemplates;
    use serde_json::json;

    struct Fixture {
        store: Arc<MemoryStore>,
        email: Arc<RecordingEmail>,
        service: ReportServiceImpl,
        org: OrgId,
        ceo: User,
        pm: User,
        officer: User,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let email = Arc::new(RecordingEmail::default());
        let service = ReportServiceImpl::new(
            store.clone(),
            store.clone(),
            Mailer::new(email.clone(), EmailTemplates::new("http://app.test")),
        );

        let org = store.seed_org("Acme");
        let ceo = store.seed_user("Ceo", "ceo@acme.test", "h", Some(org));
        store.grant(ceo.id, RoleName::Ceo, org);
        let pm = store.seed_user("Pm", "pm@acme.test", "h", Some(org));
        store.grant(pm.id, RoleName::ProjectManager, org);
        let officer = store.seed_user("Officer", "officer@acme.test", "h", Some(org));
        store.grant(officer.id, RoleName::Officer, org);

        Fixture {
            store,
            email,
            service,
            org,
            ceo,
            pm,
            officer,
        }
    }

    impl Fixture {
        fn as_ceo(&self) -> Claims {
            claims(self.ceo.id, Some(self.org), vec![RoleName::Ceo])
        }

        fn as_officer(&self) -> Claims {
            let mut c = claims(self.officer.id, Some(self.org), vec![RoleName::Officer]);
            c.name = self.officer.name.clone();
            c
        }

        async fn template(&self) -> ReportTemplate {
            self.service
                .create_template(
                    &self.as_ceo(),
                    CreateTemplateRequest {
                        name: "Weekly sales".to_string(),
                        description: None,
                        fields: json!([{"name": "revenue", "type": "number"}]),
                        required_frequency: Some(ReportFrequency::Weekly),
                    },
                )
                .await
                .unwrap()
        }

        async fn submitted(&self) -> SubmittedReport {
            let template = self.template().await;
            self.service
                .submit(
                    &self.as_officer(),
                    SubmitReportRequest {
                        template_id: template.id,
                        report_data: json!({"revenue": 1200}),
                        reporting_period_start: None,
                        reporting_period_end: None,
                    },
                )
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_only_managers_create_templates() {
        let f = fixture();
        let err = f
            .service
            .create_template(
                &f.as_officer(),
                CreateTemplateRequest {
                    name: "Nope".to_string(),
                    description: None,
                    fields: json!([]),
                    required_frequency: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let template = f.template().await;
        assert_eq!(template.created_by, Some(f.ceo.id));
        assert_eq!(template.org_id, f.org);
        assert_eq!(f.service.list_templates(&f.as_officer()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_emails_managers() {
        let f = fixture();
        let report = f.submitted().await;

        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.submitted_by, f.officer.id);

        let mut recipients = f.email.recipients();
        recipients.sort();
        assert_eq!(recipients, vec!["ceo@acme.test".to_string(), "pm@acme.test".to_string()]);
        assert!(f.email.sent()[0].1.subject.contains("Weekly sales"));
        assert!(f.email.sent()[0].1.html.contains("Officer"));
    }

    #[tokio::test]
    async fn test_submit_to_foreign_template_is_not_found() {
        let f = fixture();
        let other_org = f.store.seed_org("Globex");
        let outsider = claims(f.officer.id, Some(other_org), vec![RoleName::Officer]);
        let template = f.template().await;

        let err = f
            .service
            .submit(
                &outsider,
                SubmitReportRequest {
                    template_id: template.id,
                    report_data: json!({}),
                    reporting_period_start: None,
                    reporting_period_end: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = f
            .service
            .submit(
                &f.as_officer(),
                SubmitReportRequest {
                    template_id: TemplateId(9999),
                    report_data: json!({}),
                    reporting_period_start: None,
                    reporting_period_end: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_review_outcomes() {
        let f = fixture();
        let report = f.submitted().await;

        let err = f
            .service
            .review(
                &f.as_ceo(),
                report.id,
                ReviewReportRequest {
                    status: ReportStatus::Pending,
                    review_notes: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = f
            .service
            .review(
                &f.as_officer(),
                report.id,
                ReviewReportRequest {
                    status: ReportStatus::Approved,
                    review_notes: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let reviewed = f
            .service
            .review(
                &f.as_ceo(),
                report.id,
                ReviewReportRequest {
                    status: ReportStatus::Rejected,
                    review_notes: Some("Missing totals".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(reviewed.status, ReportStatus::Rejected);
        assert_eq!(reviewed.reviewed_by, Some(f.ceo.id));
        assert!(reviewed.review_date.is_some());

        let (to, message) = f.email.sent().pop().unwrap();
        assert_eq!(to, "officer@acme.test");
        assert!(message.subject.contains("rejected"));
        assert!(message.html.contains("Missing totals"));
    }

    #[tokio::test]
    async fn test_review_outside_org_is_not_found() {
        let f = fixture();
        let report = f.submitted().await;
        let other_org = f.store.seed_org("Globex");

        let err = f
            .service
            .review(
                &claims(f.ceo.id, Some(other_org), vec![RoleName::Ceo]),
                report.id,
                ReviewReportRequest {
                    status: ReportStatus::Approved,
                    review_notes: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(f.store.report(report.id).unwrap().status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn test_comments_notify_participants_except_author() {
        let f = fixture();
        let report = f.submitted().await;
        let sent_before = f.email.sent().len();

        let mut pm = claims(f.pm.id, Some(f.org), vec![RoleName::ProjectManager]);
        pm.name = "Pm".to_string();
        f.service
            .add_comment(&pm, report.id, AddCommentRequest { comment: "Numbers?".to_string() })
            .await
            .unwrap();
        let first_round: Vec<String> = f.email.recipients().split_off(sent_before);
        assert_eq!(first_round, vec!["officer@acme.test".to_string()]);

        let sent_before = f.email.sent().len();
        f.service
            .add_comment(&f.as_officer(), report.id, AddCommentRequest { comment: "Added".to_string() })
            .await
            .unwrap();
        let second_round: Vec<String> = f.email.recipients().split_off(sent_before);
        assert_eq!(second_round, vec!["pm@acme.test".to_string()]);

        let detail = f.service.get_report(&f.as_ceo(), report.id).await.unwrap();
        assert_eq!(detail.report.template_name, "Weekly sales");
        let comments: Vec<&str> = detail.comments.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(comments, vec!["Numbers?", "Added"]);
    }

    #[tokio::test]
    async fn test_comment_on_missing_report() {
        let f = fixture();
        let err = f
            .service
            .add_comment(&f.as_ceo(), ReportId(404), AddCommentRequest { comment: "hi".to_string() })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_reports_filters_by_status() {
        let f = fixture();
        let first = f.submitted().await;
        f.submitted().await;
        f.service
            .review(
                &f.as_ceo(),
                first.id,
                ReviewReportRequest {
                    status: ReportStatus::Approved,
                    review_notes: None,
                },
            )
            .await
            .unwrap();

        let all = f
            .service
            .list_reports(&f.as_ceo(), ReportFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);

        let approved = f
            .service
            .list_reports(
                &f.as_ceo(),
                ReportFilter {
                    status: Some(ReportStatus::Approved),
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(approved.pagination.total, 1);
        assert_eq!(approved.reports[0].report.id, first.id);
    }
}
