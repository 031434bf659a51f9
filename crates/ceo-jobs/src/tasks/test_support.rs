//! Repository stubs and sender doubles for task tests.

use async_trait::async_trait;
use ceo_core::{
    ActivityItem, CeoError, CeoResult, Contact, HourlyActivity, MetricsCounts, NewReportTemplate,
    NewSubmittedReport, NewUser, OrgId, OrgMetrics, Organization, Page, PageRequest,
    PerformanceStats, ReminderCandidate, ReportComment, ReportId, ReportStats, ReportStatus,
    ReportSummary, ReportTemplate, RoleName, SubmittedReport, TeamMemberStats,
    TemplateDistribution, TemplateId, TimelinePoint, TrendPoint, User, UserId, UserStats,
};
use ceo_notify::{EmailMessage, EmailSender, WhatsAppSender};
use ceo_repository::{DashboardRepository, OrganizationRepository, ReportRepository};
use chrono::{DateTime, Utc};
use mockall::mock;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

fn unused<T>() -> CeoResult<T> {
    Err(CeoError::internal("not used by scheduled tasks"))
}

mock! {
    pub WhatsApp {}

    #[async_trait]
    impl WhatsAppSender for WhatsApp {
        async fn send(&self, to: &str, body: &str) -> CeoResult<()>;
        fn is_enabled(&self) -> bool;
    }
}

/// Email sender that keeps every message.
#[derive(Default)]
pub struct RecordingEmail {
    sent: Mutex<Vec<(String, EmailMessage)>>,
}

impl RecordingEmail {
    pub fn sent(&self) -> Vec<(String, EmailMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent().into_iter().map(|(to, _)| to).collect()
    }
}

#[async_trait]
impl EmailSender for RecordingEmail {
    async fn send(&self, to: &str, message: EmailMessage) -> CeoResult<()> {
        self.sent.lock().unwrap().push((to.to_string(), message));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Report repository that only answers reminder queries.
pub struct StubReports {
    candidates: Option<Vec<ReminderCandidate>>,
}

impl StubReports {
    pub fn new(candidates: Vec<ReminderCandidate>) -> Self {
        Self {
            candidates: Some(candidates),
        }
    }

    pub fn failing() -> Self {
        Self { candidates: None }
    }
}

#[async_trait]
impl ReportRepository for StubReports {
    async fn create_template(&self, _template: NewReportTemplate) -> CeoResult<ReportTemplate> {
        unused()
    }

    async fn list_templates(&self, _org_id: OrgId) -> CeoResult<Vec<ReportTemplate>> {
        unused()
    }

    async fn find_template(&self, _id: TemplateId, _org_id: OrgId) -> CeoResult<Option<ReportTemplate>> {
        unused()
    }

    async fn submit(&self, _report: NewSubmittedReport) -> CeoResult<SubmittedReport> {
        unused()
    }

    async fn find_report(&self, _id: ReportId, _org_id: OrgId) -> CeoResult<Option<ReportSummary>> {
        unused()
    }

    async fn list_reports(
        &self,
        _org_id: OrgId,
        _status: Option<ReportStatus>,
        _page: PageRequest,
    ) -> CeoResult<Page<ReportSummary>> {
        unused()
    }

    async fn review(
        &self,
        _id: ReportId,
        _org_id: OrgId,
        _reviewer: UserId,
        _status: ReportStatus,
        _notes: Option<&str>,
    ) -> CeoResult<Option<SubmittedReport>> {
        unused()
    }

    async fn add_comment(&self, _report_id: ReportId, _user_id: UserId, _comment: &str) -> CeoResult<ReportComment> {
        unused()
    }

    async fn list_comments(&self, _report_id: ReportId) -> CeoResult<Vec<ReportComment>> {
        unused()
    }

    async fn comment_participants(&self, _report_id: ReportId, _exclude: UserId) -> CeoResult<Vec<Contact>> {
        unused()
    }

    async fn reminder_candidates(&self, roles: &[RoleName]) -> CeoResult<Vec<ReminderCandidate>> {
        assert_eq!(roles, ceo_core::REMINDER_ROLES.as_slice());
        self.candidates
            .clone()
            .ok_or_else(|| CeoError::Database("connection reset".to_string()))
    }
}

/// Organization repository that only lists IDs.
pub struct StubOrganizations {
    ids: Vec<OrgId>,
}

impl StubOrganizations {
    pub fn new(ids: Vec<OrgId>) -> Self {
        Self { ids }
    }
}

#[async_trait]
impl OrganizationRepository for StubOrganizations {
    async fn create_with_owner(&self, _org_name: &str, _owner: NewUser) -> CeoResult<(Organization, User)> {
        unused()
    }

    async fn invite_member(
        &self,
        _org_id: OrgId,
        _user: NewUser,
        _roles: &[RoleName],
    ) -> CeoResult<(User, Vec<RoleName>)> {
        unused()
    }

    async fn find_by_id(&self, _id: OrgId) -> CeoResult<Option<Organization>> {
        unused()
    }

    async fn list_ids(&self) -> CeoResult<Vec<OrgId>> {
        Ok(self.ids.clone())
    }
}

/// Dashboard repository that serves canned counts and records snapshots.
#[derive(Default)]
pub struct StubDashboards {
    counts: Mutex<HashMap<OrgId, MetricsCounts>>,
    failing: Mutex<HashSet<OrgId>>,
    stored: Mutex<Vec<(OrgId, OrgMetrics)>>,
}

impl StubDashboards {
    pub fn set_counts(&self, org_id: OrgId, counts: MetricsCounts) {
        self.counts.lock().unwrap().insert(org_id, counts);
    }

    pub fn fail_for(&self, org_id: OrgId) {
        self.failing.lock().unwrap().insert(org_id);
    }

    pub fn stored(&self) -> Vec<(OrgId, OrgMetrics)> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl DashboardRepository for StubDashboards {
    async fn latest_metrics(&self, _org_id: OrgId) -> CeoResult<Option<serde_json::Value>> {
        unused()
    }

    async fn user_stats(&self, _org_id: OrgId) -> CeoResult<UserStats> {
        unused()
    }

    async fn report_stats(&self, _org_id: OrgId, _since: DateTime<Utc>) -> CeoResult<ReportStats> {
        unused()
    }

    async fn trends(&self, _org_id: OrgId, _since: DateTime<Utc>) -> CeoResult<Vec<TrendPoint>> {
        unused()
    }

    async fn activity(&self, _org_id: OrgId, _page: PageRequest) -> CeoResult<Page<ActivityItem>> {
        unused()
    }

    async fn performance_stats(&self, _org_id: OrgId, _user_id: UserId, _since: DateTime<Utc>) -> CeoResult<PerformanceStats> {
        unused()
    }

    async fn performance_timeline(&self, _org_id: OrgId, _user_id: UserId, _since: DateTime<Utc>) -> CeoResult<Vec<TimelinePoint>> {
        unused()
    }

    async fn report_types(&self, _org_id: OrgId, _user_id: UserId, _since: DateTime<Utc>) -> CeoResult<Vec<TemplateDistribution>> {
        unused()
    }

    async fn team_stats(&self, _org_id: OrgId, _since: DateTime<Utc>) -> CeoResult<Vec<TeamMemberStats>> {
        unused()
    }

    async fn activity_by_hour(&self, _org_id: OrgId, _since: DateTime<Utc>) -> CeoResult<Vec<HourlyActivity>> {
        unused()
    }

    async fn metrics_counts(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<MetricsCounts> {
        assert!(since < Utc::now());
        if self.failing.lock().unwrap().contains(&org_id) {
            return Err(CeoError::Database("query timed out".to_string()));
        }
        Ok(self.counts.lock().unwrap().get(&org_id).copied().unwrap_or_default())
    }

    async fn store_metrics(&self, org_id: OrgId, metrics: &OrgMetrics) -> CeoResult<()> {
        self.stored.lock().unwrap().push((org_id, *metrics));
        Ok(())
    }
}
