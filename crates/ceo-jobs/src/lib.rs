//! # CEO Jobs
//!
//! In-process cron scheduler and the recurring tasks of the CEO platform:
//! - daily report reminders by email and WhatsApp
//! - periodic organization metrics snapshots
//!
//! Each registered task runs in its own tokio loop that sleeps until the
//! next cron fire time. Loops stop when [`Scheduler::stop`] broadcasts the
//! shutdown signal.

pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod tasks;

pub use error::{JobError, JobResult};
pub use metrics::{register_metrics, SchedulerMetrics};
pub use scheduler::{ScheduledTask, ScheduledTaskInfo, Scheduler, SchedulerStats};
pub use tasks::{OrgMetricsTask, ReportReminderTask};
