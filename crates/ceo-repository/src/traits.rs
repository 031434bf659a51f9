//! Repository trait definitions.
//!
//! Every query that reads tenant data takes the caller's `OrgId`, so a row
//! from another organization is indistinguishable from a missing one.

use async_trait::async_trait;
use ceo_core::{
    ActivityItem, CeoResult, Contact, DeliveryAttempt, HourlyActivity, Interface, Member,
    MetricsCounts, NewNotification, NewNotificationTemplate, NewReportTemplate, NewSubmittedReport,
    NewUser, Notification, NotificationId, NotificationPreferences, NotificationTemplateId, OrgId,
    OrgMetrics, Organization, Page, PageRequest, PerformanceStats, Recipient, ReminderCandidate,
    ReportComment, ReportId, ReportStats, ReportStatus, ReportSummary, ReportTemplate, RoleName,
    SubmittedReport, TeamMemberStats, TemplateDistribution, TemplateId, TimelinePoint, TrendPoint,
    User, UserId, UserStats,
};
use chrono::{DateTime, Utc};

/// User repository trait.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> CeoResult<Option<User>>;

    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> CeoResult<Option<User>>;

    /// Checks if an email is already registered.
    async fn exists_by_email(&self, email: &str) -> CeoResult<bool>;

    /// Inserts a user outside any transaction.
    async fn create(&self, user: NewUser) -> CeoResult<User>;

    /// Marks the owner of a verification token as verified and clears the token.
    async fn verify_email(&self, token: &str) -> CeoResult<Option<User>>;

    /// Stores a password reset token.
    async fn set_reset_token(&self, id: UserId, token: &str, expires_at: DateTime<Utc>) -> CeoResult<()>;

    /// Replaces the password of the user holding an unexpired reset token.
    ///
    /// Returns false when the token is unknown or expired.
    async fn reset_password(&self, token: &str, password_hash: &str, now: DateTime<Utc>) -> CeoResult<bool>;

    /// Activates an invited user and sets their password.
    async fn accept_invitation(&self, token: &str, password_hash: &str) -> CeoResult<Option<User>>;

    /// Records a successful login.
    async fn record_login(&self, id: UserId) -> CeoResult<()>;

    /// Roles the user holds in the organization.
    async fn find_roles(&self, id: UserId, org_id: OrgId) -> CeoResult<Vec<RoleName>>;

    /// Finds a member of the organization.
    async fn find_member(&self, id: UserId, org_id: OrgId) -> CeoResult<Option<Member>>;

    /// Lists the organization's members.
    async fn list_members(&self, org_id: OrgId, page: PageRequest) -> CeoResult<Page<Member>>;

    /// Active members holding any of the roles.
    async fn find_contacts_by_roles(&self, org_id: OrgId, roles: &[RoleName]) -> CeoResult<Vec<Contact>>;

    /// Replaces the notification preferences.
    async fn update_preferences(&self, id: UserId, preferences: NotificationPreferences) -> CeoResult<()>;

    /// Stores a pending WhatsApp number and its verification code.
    async fn start_whatsapp_verification(
        &self,
        id: UserId,
        number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> CeoResult<()>;

    /// Promotes the pending number if the code matches and has not expired.
    ///
    /// Returns the verified number.
    async fn confirm_whatsapp(&self, id: UserId, code: &str, now: DateTime<Utc>) -> CeoResult<Option<String>>;
}

/// Organization repository trait.
#[async_trait]
pub trait OrganizationRepository: Interface + Send + Sync {
    /// Creates an organization and its CEO in one transaction.
    async fn create_with_owner(&self, org_name: &str, owner: NewUser) -> CeoResult<(Organization, User)>;

    /// Creates an inactive member and their role assignments in one transaction.
    ///
    /// Returns the roles that were actually assigned.
    async fn invite_member(
        &self,
        org_id: OrgId,
        user: NewUser,
        roles: &[RoleName],
    ) -> CeoResult<(User, Vec<RoleName>)>;

    /// Finds an organization by ID.
    async fn find_by_id(&self, id: OrgId) -> CeoResult<Option<Organization>>;

    /// IDs of every organization.
    async fn list_ids(&self) -> CeoResult<Vec<OrgId>>;
}

/// Report repository trait.
#[async_trait]
pub trait ReportRepository: Interface + Send + Sync {
    /// Creates a template.
    async fn create_template(&self, template: NewReportTemplate) -> CeoResult<ReportTemplate>;

    /// Templates of the organization, newest first.
    async fn list_templates(&self, org_id: OrgId) -> CeoResult<Vec<ReportTemplate>>;

    /// Finds a template of the organization.
    async fn find_template(&self, id: TemplateId, org_id: OrgId) -> CeoResult<Option<ReportTemplate>>;

    /// Inserts a pending submission.
    async fn submit(&self, report: NewSubmittedReport) -> CeoResult<SubmittedReport>;

    /// Finds a submission of the organization.
    async fn find_report(&self, id: ReportId, org_id: OrgId) -> CeoResult<Option<ReportSummary>>;

    /// Lists submissions, newest first.
    async fn list_reports(
        &self,
        org_id: OrgId,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> CeoResult<Page<ReportSummary>>;

    /// Sets the review outcome. Returns `None` when the report is not in the organization.
    async fn review(
        &self,
        id: ReportId,
        org_id: OrgId,
        reviewer: UserId,
        status: ReportStatus,
        notes: Option<&str>,
    ) -> CeoResult<Option<SubmittedReport>>;

    /// Adds a comment.
    async fn add_comment(&self, report_id: ReportId, user_id: UserId, comment: &str) -> CeoResult<ReportComment>;

    /// Comments on a report, oldest first.
    async fn list_comments(&self, report_id: ReportId) -> CeoResult<Vec<ReportComment>>;

    /// Submitter and previous commenters of a report, except `exclude`.
    async fn comment_participants(&self, report_id: ReportId, exclude: UserId) -> CeoResult<Vec<Contact>>;

    /// Every (template with a cadence, responsible member) pair with the template's last submission time.
    async fn reminder_candidates(&self, roles: &[RoleName]) -> CeoResult<Vec<ReminderCandidate>>;
}

/// Dashboard and metrics queries.
#[async_trait]
pub trait DashboardRepository: Interface + Send + Sync {
    /// Latest stored metrics snapshot.
    async fn latest_metrics(&self, org_id: OrgId) -> CeoResult<Option<serde_json::Value>>;

    /// Membership counters.
    async fn user_stats(&self, org_id: OrgId) -> CeoResult<UserStats>;

    /// Report counters since the given time.
    async fn report_stats(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<ReportStats>;

    /// Daily submissions and approvals since the given time.
    async fn trends(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<Vec<TrendPoint>>;

    /// Submissions and comments, newest first.
    async fn activity(&self, org_id: OrgId, page: PageRequest) -> CeoResult<Page<ActivityItem>>;

    /// A member's counters since the given time.
    async fn performance_stats(&self, org_id: OrgId, user_id: UserId, since: DateTime<Utc>) -> CeoResult<PerformanceStats>;

    /// A member's daily submissions since the given time.
    async fn performance_timeline(&self, org_id: OrgId, user_id: UserId, since: DateTime<Utc>) -> CeoResult<Vec<TimelinePoint>>;

    /// A member's submissions per template since the given time.
    async fn report_types(&self, org_id: OrgId, user_id: UserId, since: DateTime<Utc>) -> CeoResult<Vec<TemplateDistribution>>;

    /// Per-member totals since the given time.
    async fn team_stats(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<Vec<TeamMemberStats>>;

    /// Submissions and comments per hour of day since the given time.
    async fn activity_by_hour(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<Vec<HourlyActivity>>;

    /// Raw counts for the metrics snapshot.
    async fn metrics_counts(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<MetricsCounts>;

    /// Stores a metrics snapshot.
    async fn store_metrics(&self, org_id: OrgId, metrics: &OrgMetrics) -> CeoResult<()>;
}

/// Notification repository trait.
#[async_trait]
pub trait NotificationRepository: Interface + Send + Sync {
    /// Stores the authored broadcast.
    async fn create_template(&self, template: NewNotificationTemplate) -> CeoResult<NotificationTemplateId>;

    /// Active members of the organization, optionally restricted to the given IDs.
    async fn find_recipients(&self, org_id: OrgId, user_ids: Option<&[UserId]>) -> CeoResult<Vec<Recipient>>;

    /// Inserts a per-user notification with every channel pending.
    async fn create(&self, notification: NewNotification) -> CeoResult<Notification>;

    /// Writes the log row for an attempt and merges its status into the notification.
    async fn record_attempt(&self, id: NotificationId, attempt: &DeliveryAttempt) -> CeoResult<()>;

    /// The user's notifications, newest first.
    async fn list_for_user(&self, user_id: UserId, unread_only: bool, page: PageRequest) -> CeoResult<Page<Notification>>;

    /// All unread notifications of the user, newest first.
    async fn unread_for_user(&self, user_id: UserId) -> CeoResult<Vec<Notification>>;

    /// Marks the user's notification as read. Returns false if it is not theirs.
    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> CeoResult<bool>;
}
