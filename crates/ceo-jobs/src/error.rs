//! Job error types.

use ceo_core::CeoError;
use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Job-related errors.
#[derive(Debug, Error)]
pub enum JobError {
    /// Task run failed.
    #[error("Job execution failed: {0}")]
    ExecutionFailed(String),

    /// Task not registered.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Scheduler error.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Configuration error, such as an invalid cron expression.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from the data or delivery layer.
    #[error(transparent)]
    Ceo(#[from] CeoError),
}
