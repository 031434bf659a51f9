//! Daily report reminders.

use crate::error::JobResult;
use crate::metrics::SchedulerMetrics;
use crate::scheduler::ScheduledTask;
use async_trait::async_trait;
use ceo_core::{ReminderCandidate, REMINDER_ROLES};
use ceo_notify::whatsapp::templates;
use ceo_notify::WhatsAppSender;
use ceo_repository::ReportRepository;
use ceo_service::Mailer;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reminds members about templates they have not submitted recently.
///
/// Every CEO, project manager and officer of an organization is reminded
/// about each of its templates with a fixed cadence once the cadence has
/// elapsed since the template's last submission.
pub struct ReportReminderTask {
    reports: Arc<dyn ReportRepository>,
    mailer: Mailer,
    whatsapp: Arc<dyn WhatsAppSender>,
}

impl ReportReminderTask {
    pub const NAME: &'static str = "report_reminder";

    pub fn new(reports: Arc<dyn ReportRepository>, mailer: Mailer, whatsapp: Arc<dyn WhatsAppSender>) -> Self {
        Self {
            reports,
            mailer,
            whatsapp,
        }
    }

    async fn remind(&self, candidate: &ReminderCandidate, now: DateTime<Utc>) -> (bool, bool) {
        let message = self.mailer.templates().report_reminder(
            &candidate.user_name,
            &candidate.template_name,
            candidate.frequency,
        );
        let emailed = self.mailer.send(&candidate.email, message).await;

        let mut messaged = false;
        if let Some(number) = candidate.whatsapp_number.as_deref() {
            if self.whatsapp.is_enabled() {
                let body = templates::report_due(&candidate.template_name, &due_date(candidate, now));
                match self.whatsapp.send(number, &body).await {
                    Ok(()) => messaged = true,
                    Err(e) => warn!(
                        user_id = %candidate.user_id,
                        template_id = %candidate.template_id,
                        error = %e,
                        "Failed to send WhatsApp reminder"
                    ),
                }
            }
        }

        (emailed, messaged)
    }
}

/// Date the template became due: one cadence after the last submission, today if never submitted.
fn due_date(candidate: &ReminderCandidate, now: DateTime<Utc>) -> String {
    let due = match (candidate.last_submission, candidate.frequency.reminder_interval_days()) {
        (Some(last), Some(days)) => last + Duration::days(days),
        _ => now,
    };
    due.date_naive().format("%Y-%m-%d").to_string()
}

#[async_trait]
impl ScheduledTask for ReportReminderTask {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) -> JobResult<()> {
        let now = Utc::now();
        let candidates = self.reports.reminder_candidates(&REMINDER_ROLES).await?;
        debug!(candidates = candidates.len(), "Checking report reminders");

        let mut emails = 0u64;
        let mut messages = 0u64;
        for candidate in candidates
            .iter()
            .filter(|c| c.frequency.reminder_due(c.last_submission, now))
        {
            let (emailed, messaged) = self.remind(candidate, now).await;
            emails += u64::from(emailed);
            messages += u64::from(messaged);
        }

        SchedulerMetrics::reminders_sent("email", emails);
        SchedulerMetrics::reminders_sent("whatsapp", messages);
        info!(emails, whatsapp = messages, "Report reminders sent");
        Ok(())
    }
}

impl std::fmt::Debug for ReportReminderTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportReminderTask").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::test_support::{MockWhatsApp, RecordingEmail, StubReports};
    use ceo_core::{OrgId, ReportFrequency, TemplateId, UserId};
    use ceo_notify::EmailTemplates;

    fn candidate(
        user: i32,
        frequency: ReportFrequency,
        last_submission: Option<DateTime<Utc>>,
        whatsapp: Option<&str>,
    ) -> ReminderCandidate {
        ReminderCandidate {
            template_id: TemplateId(1),
            template_name: "Weekly sales".to_string(),
            frequency,
            org_id: OrgId(1),
            user_id: UserId(user),
            user_name: format!("User {user}"),
            email: format!("user{user}@acme.test"),
            whatsapp_number: whatsapp.map(ToString::to_string),
            last_submission,
        }
    }

    fn task(candidates: Vec<ReminderCandidate>, email: Arc<RecordingEmail>, whatsapp: MockWhatsApp) -> ReportReminderTask {
        ReportReminderTask::new(
            Arc::new(StubReports::new(candidates)),
            Mailer::new(email, EmailTemplates::new("http://app.test")),
            Arc::new(whatsapp),
        )
    }

    #[tokio::test]
    async fn test_reminds_only_due_candidates() {
        let now = Utc::now();
        let email = Arc::new(RecordingEmail::default());
        let mut whatsapp = MockWhatsApp::new();
        whatsapp.expect_is_enabled().return_const(true);
        whatsapp.expect_send().never();

        let task = task(
            vec![
                candidate(1, ReportFrequency::Weekly, None, None),
                candidate(2, ReportFrequency::Weekly, Some(now - Duration::days(3)), None),
                candidate(3, ReportFrequency::Daily, Some(now - Duration::days(2)), None),
                candidate(4, ReportFrequency::Custom, None, None),
                candidate(5, ReportFrequency::Custom, Some(now - Duration::days(400)), None),
            ],
            email.clone(),
            whatsapp,
        );

        task.run().await.unwrap();

        assert_eq!(
            email.recipients(),
            vec![
                "user1@acme.test".to_string(),
                "user3@acme.test".to_string(),
                "user4@acme.test".to_string()
            ]
        );
        let (_, message) = &email.sent()[0];
        assert_eq!(message.subject, "Reminder: Weekly sales report is due");
        assert!(message.html.contains("User 1"));
    }

    #[tokio::test]
    async fn test_whatsapp_reminder_when_number_present() {
        let email = Arc::new(RecordingEmail::default());
        let mut whatsapp = MockWhatsApp::new();
        whatsapp.expect_is_enabled().return_const(true);
        whatsapp
            .expect_send()
            .withf(|to, body| to == "+15550001" && body.starts_with("📊 Report Due: Weekly sales"))
            .times(1)
            .returning(|_, _| Ok(()));

        let task = task(
            vec![
                candidate(1, ReportFrequency::Weekly, None, Some("+15550001")),
                candidate(2, ReportFrequency::Weekly, None, None),
            ],
            email.clone(),
            whatsapp,
        );

        task.run().await.unwrap();
        assert_eq!(email.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_whatsapp_failure_does_not_fail_run() {
        let email = Arc::new(RecordingEmail::default());
        let mut whatsapp = MockWhatsApp::new();
        whatsapp.expect_is_enabled().return_const(true);
        whatsapp
            .expect_send()
            .times(2)
            .returning(|_, _| Err(ceo_core::CeoError::external("Twilio", "down")));

        let task = task(
            vec![
                candidate(1, ReportFrequency::Daily, None, Some("+15550001")),
                candidate(2, ReportFrequency::Daily, None, Some("+15550002")),
            ],
            email.clone(),
            whatsapp,
        );

        task.run().await.unwrap();
        assert_eq!(email.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_whatsapp_is_skipped() {
        let email = Arc::new(RecordingEmail::default());
        let mut whatsapp = MockWhatsApp::new();
        whatsapp.expect_is_enabled().return_const(false);
        whatsapp.expect_send().never();

        let task = task(
            vec![candidate(1, ReportFrequency::Monthly, None, Some("+15550001"))],
            email.clone(),
            whatsapp,
        );
        task.run().await.unwrap();
        assert_eq!(email.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_repository_failure_fails_run() {
        let task = ReportReminderTask::new(
            Arc::new(StubReports::failing()),
            Mailer::new(Arc::new(RecordingEmail::default()), EmailTemplates::new("http://app.test")),
            Arc::new(MockWhatsApp::new()),
        );
        assert!(task.run().await.is_err());
    }

    #[test]
    fn test_due_date() {
        let now = Utc::now();
        let last = now - Duration::days(10);
        let weekly = candidate(1, ReportFrequency::Weekly, Some(last), None);
        assert_eq!(
            due_date(&weekly, now),
            (last + Duration::days(7)).date_naive().format("%Y-%m-%d").to_string()
        );

        let never = candidate(1, ReportFrequency::Weekly, None, None);
        assert_eq!(due_date(&never, now), now.date_naive().format("%Y-%m-%d").to_string());
    }
}
