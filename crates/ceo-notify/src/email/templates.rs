//! HTML email templates.

use super::EmailMessage;
use ceo_core::{ReportFrequency, ReportId, ReportStatus};

/// Renders the platform's emails. Links point at the frontend.
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    frontend_url: String,
}

impl EmailTemplates {
    /// Creates templates linking to `frontend_url`.
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn link(&self, path: &str) -> String {
        format!("{}{}", self.frontend_url, path)
    }

    pub fn verification(&self, token: &str) -> EmailMessage {
        let link = self.link(&format!("/verify-email?token={token}"));
        EmailMessage::new(
            "Verify Your Email",
            format!(
                "<h1>Welcome to CEO!</h1>\
                 <p>Please verify your email by clicking the link below:</p>\
                 <a href=\"{link}\">Verify Email</a>\
                 <p>If you didn't create this account, please ignore this email.</p>"
            ),
        )
    }

    pub fn password_reset(&self, token: &str) -> EmailMessage {
        let link = self.link(&format!("/reset-password?token={token}"));
        EmailMessage::new(
            "Reset Your Password",
            format!(
                "<h1>Password Reset Request</h1>\
                 <p>Click the link below to reset your password:</p>\
                 <a href=\"{link}\">Reset Password</a>\
                 <p>If you didn't request this, please ignore this email.</p>"
            ),
        )
    }

    pub fn welcome(&self, name: &str) -> EmailMessage {
        let name = escape_html(name);
        EmailMessage::new(
            "Welcome to CEO!",
            format!(
                "<h1>Welcome {name}!</h1>\
                 <p>Thank you for joining CEO. We're excited to help you manage your organization more efficiently.</p>\
                 <p>If you have any questions, feel free to reach out to our support team.</p>"
            ),
        )
    }

    pub fn team_invitation(&self, inviter_name: &str, org_name: &str, token: &str) -> EmailMessage {
        let link = self.link(&format!("/accept-invite?token={token}"));
        let inviter = escape_html(inviter_name);
        let org = escape_html(org_name);
        EmailMessage::new(
            format!("Invitation to join {org_name}"),
            format!(
                "<h1>You've been invited!</h1>\
                 <p>{inviter} has invited you to join {org} on CEO.</p>\
                 <p>Click the link below to accept the invitation:</p>\
                 <a href=\"{link}\">Accept Invitation</a>"
            ),
        )
    }

    pub fn report_submission(&self, report_id: ReportId, submitter_name: &str, template_name: &str) -> EmailMessage {
        let link = self.link(&format!("/reports/{report_id}"));
        let submitter = escape_html(submitter_name);
        let template = escape_html(template_name);
        EmailMessage::new(
            format!("New report submitted: {template_name}"),
            format!(
                "<h1>New Report Submitted</h1>\
                 <p>{submitter} submitted a new <strong>{template}</strong> report.</p>\
                 <a href=\"{link}\">Review Report</a>"
            ),
        )
    }

    pub fn report_reviewed(
        &self,
        report_id: ReportId,
        status: ReportStatus,
        reviewer_name: &str,
        notes: Option<&str>,
    ) -> EmailMessage {
        let link = self.link(&format!("/reports/{report_id}"));
        let reviewer = escape_html(reviewer_name);
        let notes = notes
            .filter(|n| !n.trim().is_empty())
            .map(|n| format!("<p><em>{}</em></p>", escape_html(n)))
            .unwrap_or_default();
        EmailMessage::new(
            format!("Your report has been {status}"),
            format!(
                "<h1>Report {status}</h1>\
                 <p>{reviewer} has {status} your report.</p>\
                 {notes}\
                 <a href=\"{link}\">View Report</a>"
            ),
        )
    }

    pub fn report_comment(&self, report_id: ReportId, commenter_name: &str, comment: &str) -> EmailMessage {
        let link = self.link(&format!("/reports/{report_id}"));
        let commenter = escape_html(commenter_name);
        let comment = escape_html(comment);
        EmailMessage::new(
            format!("New comment from {commenter_name}"),
            format!(
                "<h1>New Comment</h1>\
                 <p>{commenter} commented on a report you follow:</p>\
                 <blockquote>{comment}</blockquote>\
                 <a href=\"{link}\">View Report</a>"
            ),
        )
    }

    pub fn report_reminder(&self, user_name: &str, report_name: &str, frequency: ReportFrequency) -> EmailMessage {
        let link = self.link("/reports/submit");
        let user = escape_html(user_name);
        let report = escape_html(report_name);
        EmailMessage::new(
            format!("Reminder: {report_name} report is due"),
            format!(
                "<h1>Report Reminder</h1>\
                 <p>Hi {user},</p>\
                 <p>The {frequency} <strong>{report}</strong> report is due.</p>\
                 <a href=\"{link}\">Submit Report</a>"
            ),
        )
    }

    pub fn notification(&self, title: &str, content: &str) -> EmailMessage {
        let heading = escape_html(title);
        let body = escape_html(content).replace('\n', "<br>");
        EmailMessage::new(title, format!("<h1>{heading}</h1><p>{body}</p>"))
    }
}

/// Escapes text for inclusion in HTML.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
