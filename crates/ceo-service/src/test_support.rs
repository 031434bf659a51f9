//! In-memory repositories and sender doubles for service tests.

use async_trait::async_trait;
use ceo_config::SecurityConfig;
use ceo_core::{
    ActivityItem, CeoError, CeoResult, Channel, CommentId, Contact, DeliveryAttempt, DeliveryStatus,
    HourlyActivity, Member, MetricsCounts, NewNotification, NewNotificationTemplate,
    NewReportTemplate, NewSubmittedReport, NewUser, Notification, NotificationId,
    NotificationPreferences, NotificationTemplateId, OrgId, OrgMetrics, Organization, Page,
    PageRequest, PerformanceStats, Recipient, ReminderCandidate, ReportComment, ReportId,
    ReportStats, ReportStatus, ReportSummary, ReportTemplate, RoleName, SubmittedReport,
    TeamMemberStats, TemplateDistribution, TemplateId, TimelinePoint, TrendPoint, User, UserId,
    UserStats,
};
use ceo_notify::{EmailMessage, EmailSender, WhatsAppSender};
use ceo_repository::{
    DashboardRepository, NotificationRepository, OrganizationRepository, ReportRepository,
    UserRepository,
};
use ceo_security::{Claims, PasswordHasher, PasswordHasherInterface, TokenProvider, TokenSubject};
use chrono::{DateTime, Duration, Utc};
use mockall::mock;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

mock! {
    pub Email {}

    #[async_trait]
    impl EmailSender for Email {
        async fn send(&self, to: &str, message: EmailMessage) -> CeoResult<()>;
        fn name(&self) -> &'static str;
    }
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

pub fn security_config() -> Arc<SecurityConfig> {
    Arc::new(SecurityConfig {
        jwt_secret: "test-secret-key-that-is-at-least-32-bytes-long".to_string(),
        ..SecurityConfig::default()
    })
}

pub fn token_provider() -> Arc<TokenProvider> {
    Arc::new(TokenProvider::new(security_config()))
}

pub fn password_hasher() -> Arc<PasswordHasher> {
    Arc::new(PasswordHasher::new())
}

pub fn claims(user_id: UserId, org_id: Option<OrgId>, roles: Vec<RoleName>) -> Claims {
    Claims::new(
        &TokenSubject {
            user_id,
            name: format!("User {user_id}"),
            email: format!("user{user_id}@example.com"),
            org_id,
            roles,
        },
        "ceo".to_string(),
        "ceo-api".to_string(),
        Utc::now() + Duration::hours(1),
    )
}

#[derive(Default)]
struct UserSecrets {
    verification_token: Option<String>,
    reset: Option<(String, DateTime<Utc>)>,
    invitation_token: Option<String>,
    pending_whatsapp: Option<(String, String, DateTime<Utc>)>,
}

#[derive(Default)]
struct State {
    next_id: i32,
    users: Vec<User>,
    secrets: BTreeMap<UserId, UserSecrets>,
    user_roles: Vec<(UserId, RoleName, OrgId)>,
    orgs: Vec<Organization>,
    templates: Vec<ReportTemplate>,
    reports: Vec<SubmittedReport>,
    comments: Vec<ReportComment>,
    notification_templates: Vec<(NotificationTemplateId, NewNotificationTemplate)>,
    notifications: Vec<Notification>,
    logs: Vec<(NotificationId, DeliveryAttempt)>,
    metrics: Vec<(OrgId, OrgMetrics)>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn roles_of(&self, id: UserId, org_id: OrgId) -> Vec<RoleName> {
        let mut roles: Vec<RoleName> = self
            .user_roles
            .iter()
            .filter(|(u, _, o)| *u == id && *o == org_id)
            .map(|(_, r, _)| *r)
            .collect();
        roles.sort_by_key(|r| r.as_str());
        roles
    }

    fn insert_user(&mut self, new: NewUser) -> CeoResult<User> {
        if self.users.iter().any(|u| u.email.eq_ignore_ascii_case(&new.email)) {
            return Err(CeoError::Duplicate("users_email_key".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: UserId(self.next_id()),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            org_id: new.org_id,
            phone_number: None,
            whatsapp_number: None,
            notification_preferences: NotificationPreferences::default(),
            active: new.active,
            is_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.secrets.insert(
            user.id,
            UserSecrets {
                verification_token: new.verification_token,
                invitation_token: new.invitation_token,
                ..UserSecrets::default()
            },
        );
        self.users.push(user.clone());
        Ok(user)
    }

    fn summary(&self, report: &SubmittedReport) -> ReportSummary {
        let template_name = self
            .templates
            .iter()
            .find(|t| t.id == report.template_id)
            .map(|t| t.name.clone())
            .unwrap_or_default();
        let submitter = self.user(report.submitted_by);
        ReportSummary {
            report: report.clone(),
            template_name,
            submitter_name: submitter.map(|u| u.name.clone()).unwrap_or_default(),
            submitter_email: submitter.map(|u| u.email.clone()).unwrap_or_default(),
            reviewer_name: report
                .reviewed_by
                .and_then(|id| self.user(id))
                .map(|u| u.name.clone()),
        }
    }
}

/// One store implementing every repository trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Inserts a verified, active user with a password.
    pub fn seed_user(&self, name: &str, email: &str, password_hash: &str, org_id: Option<OrgId>) -> User {
        let mut state = self.state.lock().unwrap();
        let mut user = state
            .insert_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: Some(password_hash.to_string()),
                role: None,
                org_id,
                active: true,
                verification_token: None,
                invitation_token: None,
            })
            .unwrap();
        user.is_verified = true;
        if let Some(stored) = state.users.iter_mut().find(|u| u.id == user.id) {
            stored.is_verified = true;
        }
        user
    }

    pub fn seed_org(&self, name: &str) -> OrgId {
        let mut state = self.state.lock().unwrap();
        let id = OrgId(state.next_id());
        let now = Utc::now();
        state.orgs.push(Organization {
            id,
            name: name.to_string(),
            email: None,
            settings: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn grant(&self, user_id: UserId, role: RoleName, org_id: OrgId) {
        self.state.lock().unwrap().user_roles.push((user_id, role, org_id));
    }

    pub fn update_user(&self, id: UserId, f: impl FnOnce(&mut User)) {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            f(user);
        }
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.state.lock().unwrap().user(id).cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let state = self.state.lock().unwrap();
        state.users.iter().find(|u| u.email == email).cloned()
    }

    pub fn verification_token(&self, id: UserId) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.secrets.get(&id).and_then(|s| s.verification_token.clone())
    }

    pub fn reset_token(&self, id: UserId) -> Option<(String, DateTime<Utc>)> {
        let state = self.state.lock().unwrap();
        state.secrets.get(&id).and_then(|s| s.reset.clone())
    }

    pub fn expire_reset_token(&self, id: UserId) {
        let mut state = self.state.lock().unwrap();
        if let Some((_, expires_at)) = state.secrets.get_mut(&id).and_then(|s| s.reset.as_mut()) {
            *expires_at = Utc::now() - Duration::minutes(1);
        }
    }

    pub fn invitation_token(&self, id: UserId) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.secrets.get(&id).and_then(|s| s.invitation_token.clone())
    }

    pub fn pending_whatsapp(&self, id: UserId) -> Option<(String, String, DateTime<Utc>)> {
        let state = self.state.lock().unwrap();
        state.secrets.get(&id).and_then(|s| s.pending_whatsapp.clone())
    }

    pub fn roles(&self, id: UserId, org_id: OrgId) -> Vec<RoleName> {
        self.state.lock().unwrap().roles_of(id, org_id)
    }

    pub fn report(&self, id: ReportId) -> Option<SubmittedReport> {
        let state = self.state.lock().unwrap();
        state.reports.iter().find(|r| r.id == id).cloned()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn logs(&self) -> Vec<(NotificationId, DeliveryAttempt)> {
        self.state.lock().unwrap().logs.clone()
    }

    pub fn notification_templates(&self) -> Vec<NewNotificationTemplate> {
        let state = self.state.lock().unwrap();
        state.notification_templates.iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn stored_metrics(&self) -> Vec<(OrgId, OrgMetrics)> {
        self.state.lock().unwrap().metrics.clone()
    }

    pub fn seed_notification(&self, user_id: UserId, org_id: OrgId, title: &str) -> NotificationId {
        let mut state = self.state.lock().unwrap();
        let id = NotificationId(state.next_id());
        state.notifications.push(Notification {
            id,
            template_id: None,
            org_id,
            user_id,
            title: title.to_string(),
            content: String::new(),
            notification_type: "announcement".to_string(),
            status: BTreeMap::new(),
            read_at: None,
            created_at: Utc::now(),
        });
        id
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> CeoResult<Option<User>> {
        Ok(self.user(id))
    }

    async fn find_by_email(&self, email: &str) -> CeoResult<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> CeoResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn create(&self, user: NewUser) -> CeoResult<User> {
        self.state.lock().unwrap().insert_user(user)
    }

    async fn verify_email(&self, token: &str) -> CeoResult<Option<User>> {
        let mut state = self.state.lock().unwrap();
        let Some(id) = state
            .secrets
            .iter()
            .find(|(_, s)| s.verification_token.as_deref() == Some(token))
            .map(|(id, _)| *id)
        else {
            return Ok(None);
        };
        if let Some(secrets) = state.secrets.get_mut(&id) {
            secrets.verification_token = None;
        }
        let user = state.users.iter_mut().find(|u| u.id == id);
        Ok(user.map(|u| {
            u.is_verified = true;
            u.clone()
        }))
    }

    async fn set_reset_token(&self, id: UserId, token: &str, expires_at: DateTime<Utc>) -> CeoResult<()> {
        let mut state = self.state.lock().unwrap();
        state.secrets.entry(id).or_default().reset = Some((token.to_string(), expires_at));
        Ok(())
    }

    async fn reset_password(&self, token: &str, password_hash: &str, now: DateTime<Utc>) -> CeoResult<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(id) = state
            .secrets
            .iter()
            .find(|(_, s)| matches!(&s.reset, Some((t, exp)) if t == token && *exp > now))
            .map(|(id, _)| *id)
        else {
            return Ok(false);
        };
        if let Some(secrets) = state.secrets.get_mut(&id) {
            secrets.reset = None;
        }
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.password_hash = Some(password_hash.to_string());
        }
        Ok(true)
    }

    async fn accept_invitation(&self, token: &str, password_hash: &str) -> CeoResult<Option<User>> {
        let mut state = self.state.lock().unwrap();
        let Some(id) = state
            .secrets
            .iter()
            .find(|(_, s)| s.invitation_token.as_deref() == Some(token))
            .map(|(id, _)| *id)
        else {
            return Ok(None);
        };
        if let Some(secrets) = state.secrets.get_mut(&id) {
            secrets.invitation_token = None;
        }
        let user = state.users.iter_mut().find(|u| u.id == id);
        Ok(user.map(|u| {
            u.password_hash = Some(password_hash.to_string());
            u.active = true;
            u.is_verified = true;
            u.clone()
        }))
    }

    async fn record_login(&self, id: UserId) -> CeoResult<()> {
        self.update_user(id, |u| u.last_login = Some(Utc::now()));
        Ok(())
    }

    async fn find_roles(&self, id: UserId, org_id: OrgId) -> CeoResult<Vec<RoleName>> {
        Ok(self.roles(id, org_id))
    }

    async fn find_member(&self, id: UserId, org_id: OrgId) -> CeoResult<Option<Member>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .user(id)
            .filter(|u| u.org_id == Some(org_id))
            .map(|u| Member {
                user: u.clone(),
                roles: state.roles_of(id, org_id),
            }))
    }

    async fn list_members(&self, org_id: OrgId, page: PageRequest) -> CeoResult<Page<Member>> {
        let state = self.state.lock().unwrap();
        let members: Vec<Member> = state
            .users
            .iter()
            .filter(|u| u.org_id == Some(org_id))
            .map(|u| Member {
                user: u.clone(),
                roles: state.roles_of(u.id, org_id),
            })
            .collect();
        let total = members.len() as u64;
        let items = members
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn find_contacts_by_roles(&self, org_id: OrgId, roles: &[RoleName]) -> CeoResult<Vec<Contact>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .filter(|u| u.active && u.org_id == Some(org_id))
            .filter(|u| state.roles_of(u.id, org_id).iter().any(|r| roles.contains(r)))
            .map(Contact::from)
            .collect())
    }

    async fn update_preferences(&self, id: UserId, preferences: NotificationPreferences) -> CeoResult<()> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| CeoError::not_found("User", id))?;
        user.notification_preferences = preferences;
        Ok(())
    }

    async fn start_whatsapp_verification(
        &self,
        id: UserId,
        number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> CeoResult<()> {
        let mut state = self.state.lock().unwrap();
        state.secrets.entry(id).or_default().pending_whatsapp =
            Some((number.to_string(), code.to_string(), expires_at));
        Ok(())
    }

    async fn confirm_whatsapp(&self, id: UserId, code: &str, now: DateTime<Utc>) -> CeoResult<Option<String>> {
        let mut state = self.state.lock().unwrap();
        let number = match state.secrets.get(&id).and_then(|s| s.pending_whatsapp.as_ref()) {
            Some((number, stored, expires_at)) if stored == code && *expires_at > now => number.clone(),
            _ => return Ok(None),
        };
        if let Some(secrets) = state.secrets.get_mut(&id) {
            secrets.pending_whatsapp = None;
        }
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.whatsapp_number = Some(number.clone());
        }
        Ok(Some(number))
    }
}

#[async_trait]
impl OrganizationRepository for MemoryStore {
    async fn create_with_owner(&self, org_name: &str, owner: NewUser) -> CeoResult<(Organization, User)> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.email.eq_ignore_ascii_case(&owner.email)) {
            return Err(CeoError::Duplicate("users_email_key".to_string()));
        }
        let now = Utc::now();
        let org = Organization {
            id: OrgId(state.next_id()),
            name: org_name.to_string(),
            email: Some(owner.email.clone()),
            settings: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        };
        let user = state.insert_user(NewUser {
            org_id: Some(org.id),
            role: Some(RoleName::Ceo),
            ..owner
        })?;
        state.orgs.push(org.clone());
        state.user_roles.push((user.id, RoleName::Ceo, org.id));
        Ok((org, user))
    }

    async fn invite_member(
        &self,
        org_id: OrgId,
        user: NewUser,
        roles: &[RoleName],
    ) -> CeoResult<(User, Vec<RoleName>)> {
        let mut state = self.state.lock().unwrap();
        let user = state.insert_user(NewUser {
            org_id: Some(org_id),
            active: false,
            ..user
        })?;
        let mut assigned = Vec::new();
        for role in roles {
            if !assigned.contains(role) {
                state.user_roles.push((user.id, *role, org_id));
                assigned.push(*role);
            }
        }
        Ok((user, assigned))
    }

    async fn find_by_id(&self, id: OrgId) -> CeoResult<Option<Organization>> {
        let state = self.state.lock().unwrap();
        Ok(state.orgs.iter().find(|o| o.id == id).cloned())
    }

    async fn list_ids(&self) -> CeoResult<Vec<OrgId>> {
        Ok(self.state.lock().unwrap().orgs.iter().map(|o| o.id).collect())
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn create_template(&self, template: NewReportTemplate) -> CeoResult<ReportTemplate> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let template = ReportTemplate {
            id: TemplateId(state.next_id()),
            org_id: template.org_id,
            name: template.name,
            description: template.description,
            fields: template.fields,
            required_frequency: template.required_frequency,
            created_by: Some(template.created_by),
            created_at: now,
            updated_at: now,
        };
        state.templates.push(template.clone());
        Ok(template)
    }

    async fn list_templates(&self, org_id: OrgId) -> CeoResult<Vec<ReportTemplate>> {
        let state = self.state.lock().unwrap();
        Ok(state.templates.iter().rev().filter(|t| t.org_id == org_id).cloned().collect())
    }

    async fn find_template(&self, id: TemplateId, org_id: OrgId) -> CeoResult<Option<ReportTemplate>> {
        let state = self.state.lock().unwrap();
        Ok(state.templates.iter().find(|t| t.id == id && t.org_id == org_id).cloned())
    }

    async fn submit(&self, report: NewSubmittedReport) -> CeoResult<SubmittedReport> {
        let mut state = self.state.lock().unwrap();
        let report = SubmittedReport {
            id: ReportId(state.next_id()),
            template_id: report.template_id,
            org_id: report.org_id,
            submitted_by: report.submitted_by,
            report_data: report.report_data,
            status: ReportStatus::Pending,
            reviewed_by: None,
            review_notes: None,
            submission_date: Utc::now(),
            review_date: None,
            reporting_period_start: report.reporting_period_start,
            reporting_period_end: report.reporting_period_end,
        };
        state.reports.push(report.clone());
        Ok(report)
    }

    async fn find_report(&self, id: ReportId, org_id: OrgId) -> CeoResult<Option<ReportSummary>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reports
            .iter()
            .find(|r| r.id == id && r.org_id == org_id)
            .map(|r| state.summary(r)))
    }

    async fn list_reports(
        &self,
        org_id: OrgId,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> CeoResult<Page<ReportSummary>> {
        let state = self.state.lock().unwrap();
        let matching: Vec<ReportSummary> = state
            .reports
            .iter()
            .rev()
            .filter(|r| r.org_id == org_id && status.map_or(true, |s| r.status == s))
            .map(|r| state.summary(r))
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn review(
        &self,
        id: ReportId,
        org_id: OrgId,
        reviewer: UserId,
        status: ReportStatus,
        notes: Option<&str>,
    ) -> CeoResult<Option<SubmittedReport>> {
        let mut state = self.state.lock().unwrap();
        let report = state.reports.iter_mut().find(|r| r.id == id && r.org_id == org_id);
        Ok(report.map(|r| {
            r.status = status;
            r.reviewed_by = Some(reviewer);
            r.review_notes = notes.map(ToString::to_string);
            r.review_date = Some(Utc::now());
            r.clone()
        }))
    }

    async fn add_comment(&self, report_id: ReportId, user_id: UserId, comment: &str) -> CeoResult<ReportComment> {
        let mut state = self.state.lock().unwrap();
        let user_name = state
            .user(user_id)
            .map(|u| u.name.clone())
            .ok_or_else(|| CeoError::ReferenceMissing("report_comments_user_id_fkey".to_string()))?;
        let comment = ReportComment {
            id: CommentId(state.next_id()),
            report_id,
            user_id,
            user_name,
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, report_id: ReportId) -> CeoResult<Vec<ReportComment>> {
        let state = self.state.lock().unwrap();
        Ok(state.comments.iter().filter(|c| c.report_id == report_id).cloned().collect())
    }

    async fn comment_participants(&self, report_id: ReportId, exclude: UserId) -> CeoResult<Vec<Contact>> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<UserId> = state
            .reports
            .iter()
            .filter(|r| r.id == report_id)
            .map(|r| r.submitted_by)
            .chain(
                state
                    .comments
                    .iter()
                    .filter(|c| c.report_id == report_id)
                    .map(|c| c.user_id),
            )
            .filter(|id| *id != exclude)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids.into_iter().filter_map(|id| state.user(id)).map(Contact::from).collect())
    }

    async fn reminder_candidates(&self, roles: &[RoleName]) -> CeoResult<Vec<ReminderCandidate>> {
        let state = self.state.lock().unwrap();
        let mut candidates = Vec::new();
        for template in &state.templates {
            let Some(frequency) = template.required_frequency else {
                continue;
            };
            let last_submission = state
                .reports
                .iter()
                .filter(|r| r.template_id == template.id)
                .map(|r| r.submission_date)
                .max();
            for user in state.users.iter().filter(|u| u.active && u.org_id == Some(template.org_id)) {
                if state.roles_of(user.id, template.org_id).iter().any(|r| roles.contains(r)) {
                    candidates.push(ReminderCandidate {
                        template_id: template.id,
                        template_name: template.name.clone(),
                        frequency,
                        org_id: template.org_id,
                        user_id: user.id,
                        user_name: user.name.clone(),
                        email: user.email.clone(),
                        whatsapp_number: user.whatsapp_number.clone(),
                        last_submission,
                    });
                }
            }
        }
        Ok(candidates)
    }
}

#[async_trait]
impl DashboardRepository for MemoryStore {
    async fn latest_metrics(&self, org_id: OrgId) -> CeoResult<Option<serde_json::Value>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .metrics
            .iter()
            .rev()
            .find(|(o, _)| *o == org_id)
            .map(|(_, m)| serde_json::to_value(m).unwrap()))
    }

    async fn user_stats(&self, org_id: OrgId) -> CeoResult<UserStats> {
        let state = self.state.lock().unwrap();
        let members: Vec<&User> = state.users.iter().filter(|u| u.org_id == Some(org_id)).collect();
        let week_ago = Utc::now() - Duration::days(7);
        Ok(UserStats {
            total_users: members.len() as i64,
            active_users: members.iter().filter(|u| u.active).count() as i64,
            recently_active: members
                .iter()
                .filter(|u| u.last_login.is_some_and(|l| l >= week_ago))
                .count() as i64,
        })
    }

    async fn report_stats(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<ReportStats> {
        let state = self.state.lock().unwrap();
        let reports: Vec<&SubmittedReport> = state
            .reports
            .iter()
            .filter(|r| r.org_id == org_id && r.submission_date >= since)
            .collect();
        let count = |status| reports.iter().filter(|r| r.status == status).count() as i64;
        Ok(ReportStats {
            total_reports: reports.len() as i64,
            pending_reports: count(ReportStatus::Pending),
            approved_reports: count(ReportStatus::Approved),
            rejected_reports: count(ReportStatus::Rejected),
        })
    }

    async fn trends(&self, _org_id: OrgId, _since: DateTime<Utc>) -> CeoResult<Vec<TrendPoint>> {
        Ok(Vec::new())
    }

    async fn activity(&self, org_id: OrgId, page: PageRequest) -> CeoResult<Page<ActivityItem>> {
        let state = self.state.lock().unwrap();
        let items: Vec<ActivityItem> = state
            .reports
            .iter()
            .rev()
            .filter(|r| r.org_id == org_id)
            .map(|r| {
                let summary = state.summary(r);
                ActivityItem {
                    activity_type: "report_submission".to_string(),
                    id: r.id.into_inner(),
                    created_at: r.submission_date,
                    user_name: summary.submitter_name,
                    template_name: Some(summary.template_name),
                    detail: Some(r.status.to_string()),
                }
            })
            .collect();
        let total = items.len() as u64;
        Ok(Page::new(items, page, total))
    }

    async fn performance_stats(&self, org_id: OrgId, user_id: UserId, since: DateTime<Utc>) -> CeoResult<PerformanceStats> {
        let state = self.state.lock().unwrap();
        let reports: Vec<&SubmittedReport> = state
            .reports
            .iter()
            .filter(|r| r.org_id == org_id && r.submitted_by == user_id && r.submission_date >= since)
            .collect();
        let count = |status| reports.iter().filter(|r| r.status == status).count() as i64;
        Ok(PerformanceStats {
            total_reports: reports.len() as i64,
            approved_reports: count(ReportStatus::Approved),
            rejected_reports: count(ReportStatus::Rejected),
            pending_reports: count(ReportStatus::Pending),
            avg_review_time: None,
        })
    }

    async fn performance_timeline(&self, _org_id: OrgId, _user_id: UserId, _since: DateTime<Utc>) -> CeoResult<Vec<TimelinePoint>> {
        Ok(Vec::new())
    }

    async fn report_types(&self, _org_id: OrgId, _user_id: UserId, _since: DateTime<Utc>) -> CeoResult<Vec<TemplateDistribution>> {
        Ok(Vec::new())
    }

    async fn team_stats(&self, org_id: OrgId, _since: DateTime<Utc>) -> CeoResult<Vec<TeamMemberStats>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .filter(|u| u.org_id == Some(org_id))
            .map(|u| TeamMemberStats {
                user_id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                total_reports: state.reports.iter().filter(|r| r.submitted_by == u.id).count() as i64,
                approved_reports: state
                    .reports
                    .iter()
                    .filter(|r| r.submitted_by == u.id && r.status == ReportStatus::Approved)
                    .count() as i64,
                comments: state.comments.iter().filter(|c| c.user_id == u.id).count() as i64,
                last_activity: None,
            })
            .collect())
    }

    async fn activity_by_hour(&self, _org_id: OrgId, _since: DateTime<Utc>) -> CeoResult<Vec<HourlyActivity>> {
        Ok(Vec::new())
    }

    async fn metrics_counts(&self, org_id: OrgId, since: DateTime<Utc>) -> CeoResult<MetricsCounts> {
        let stats = self.report_stats(org_id, since).await?;
        let state = self.state.lock().unwrap();
        let mut submitters: Vec<UserId> = state
            .reports
            .iter()
            .filter(|r| r.org_id == org_id && r.submission_date >= since)
            .map(|r| r.submitted_by)
            .collect();
        submitters.sort();
        submitters.dedup();
        Ok(MetricsCounts {
            total_reports: stats.total_reports,
            approved_reports: stats.approved_reports,
            average_review_hours: None,
            active_users: submitters.len() as i64,
        })
    }

    async fn store_metrics(&self, org_id: OrgId, metrics: &OrgMetrics) -> CeoResult<()> {
        self.state.lock().unwrap().metrics.push((org_id, *metrics));
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create_template(&self, template: NewNotificationTemplate) -> CeoResult<NotificationTemplateId> {
        let mut state = self.state.lock().unwrap();
        let id = NotificationTemplateId(state.next_id());
        state.notification_templates.push((id, template));
        Ok(id)
    }

    async fn find_recipients(&self, org_id: OrgId, user_ids: Option<&[UserId]>) -> CeoResult<Vec<Recipient>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .filter(|u| u.active && u.org_id == Some(org_id))
            .filter(|u| user_ids.map_or(true, |ids| ids.contains(&u.id)))
            .map(|u| Recipient {
                contact: Contact::from(u),
                preferences: u.notification_preferences,
            })
            .collect())
    }

    async fn create(&self, notification: NewNotification) -> CeoResult<Notification> {
        let mut state = self.state.lock().unwrap();
        let notification = Notification {
            id: NotificationId(state.next_id()),
            template_id: notification.template_id,
            org_id: notification.org_id,
            user_id: notification.user_id,
            title: notification.title,
            content: notification.content,
            notification_type: notification.notification_type,
            status: Channel::all().into_iter().map(|c| (c, DeliveryStatus::Pending)).collect(),
            read_at: None,
            created_at: Utc::now(),
        };
        state.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn record_attempt(&self, id: NotificationId, attempt: &DeliveryAttempt) -> CeoResult<()> {
        let mut state = self.state.lock().unwrap();
        state.logs.push((id, attempt.clone()));
        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id) {
            n.status.insert(attempt.channel, attempt.status);
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId, unread_only: bool, page: PageRequest) -> CeoResult<Page<Notification>> {
        let state = self.state.lock().unwrap();
        let matching: Vec<Notification> = state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read()))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .collect();
        Ok(Page::new(items, page, total))
    }

    async fn unread_for_user(&self, user_id: UserId) -> CeoResult<Vec<Notification>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && !n.is_read())
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: NotificationId, user_id: UserId) -> CeoResult<bool> {
        let mut state = self.state.lock().unwrap();
        let notification = state.notifications.iter_mut().find(|n| n.id == id && n.user_id == user_id);
        Ok(notification.map_or(false, |n| {
            n.read_at.get_or_insert_with(Utc::now);
            true
        }))
    }
}

/// Hashes a password with the real hasher so login paths can verify it.
pub fn hash(password: &str) -> String {
    PasswordHasher::new().hash(password).unwrap()
}
