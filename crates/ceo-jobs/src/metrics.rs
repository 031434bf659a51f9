//! Scheduler metrics.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names for the scheduler.
pub mod names {
    /// Task runs that finished without error.
    pub const TASK_RUNS_TOTAL: &str = "ceo_scheduler_task_runs_total";
    /// Task runs that returned an error.
    pub const TASK_FAILURES_TOTAL: &str = "ceo_scheduler_task_failures_total";
    /// Task run duration in seconds.
    pub const TASK_DURATION_SECONDS: &str = "ceo_scheduler_task_duration_seconds";
    /// Reminders sent by the report reminder task.
    pub const REMINDERS_SENT_TOTAL: &str = "ceo_report_reminders_sent_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::TASK_RUNS_TOTAL, "Total number of successful scheduled task runs");
    describe_counter!(names::TASK_FAILURES_TOTAL, "Total number of failed scheduled task runs");
    describe_histogram!(names::TASK_DURATION_SECONDS, "Scheduled task run duration in seconds");
    describe_counter!(names::REMINDERS_SENT_TOTAL, "Total number of report reminders sent");
}

/// Scheduler metrics recorder.
#[derive(Clone, Copy, Debug)]
pub struct SchedulerMetrics;

impl SchedulerMetrics {
    /// Record a successful run.
    pub fn task_completed(task: &'static str, duration: Duration) {
        counter!(names::TASK_RUNS_TOTAL, "task" => task).increment(1);
        histogram!(names::TASK_DURATION_SECONDS, "task" => task, "status" => "completed")
            .record(duration.as_secs_f64());
    }

    /// Record a failed run.
    pub fn task_failed(task: &'static str, duration: Duration) {
        counter!(names::TASK_FAILURES_TOTAL, "task" => task).increment(1);
        histogram!(names::TASK_DURATION_SECONDS, "task" => task, "status" => "failed")
            .record(duration.as_secs_f64());
    }

    /// Record reminders sent on a channel.
    pub fn reminders_sent(channel: &'static str, count: u64) {
        counter!(names::REMINDERS_SENT_TOTAL, "channel" => channel).increment(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        // No recorder installed; must not panic
        register_metrics();
        SchedulerMetrics::task_completed("report_reminder", Duration::from_millis(5));
        SchedulerMetrics::task_failed("org_metrics", Duration::from_millis(5));
        SchedulerMetrics::reminders_sent("email", 2);
    }
}
