//! Recurring tasks.

mod org_metrics;
mod report_reminder;

pub use org_metrics::OrgMetricsTask;
pub use report_reminder::ReportReminderTask;

#[cfg(test)]
mod test_support;
