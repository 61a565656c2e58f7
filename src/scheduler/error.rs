//! Scheduler error types.

use thiserror::Error;

use crate::store::StorageError;

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No job registered under this name.
    #[error("job not found: {0}")]
    NotFound(String),

    /// Invalid cadence configuration.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("invalid cron expression: {0}")]
    InvalidCron(String),

    /// A job's storage access failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The scheduler loop is no longer running.
    #[error("scheduler is shut down")]
    ShutDown,
}

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
