//! Error taxonomy of the workout lifecycle.

use thiserror::Error;

use crate::store::StorageError;

/// Errors surfaced by [`WorkoutService`](super::WorkoutService).
///
/// Analytics failures never appear here; they stay inside
/// [`AnalyticsSync`](crate::analytics::AnalyticsSync).
#[derive(Debug, Error)]
pub enum WorkoutError {
    /// The session does not exist or belongs to someone else.
    #[error("workout session not found")]
    NotFound,

    /// The finish payload references an unknown or foreign exercise.
    #[error("{0}")]
    Validation(String),

    #[error("workout session is already finished")]
    AlreadyFinished,

    /// A storage constraint rejected the write.
    #[error("{0}")]
    Integrity(String),

    #[error(transparent)]
    Storage(StorageError),
}

impl WorkoutError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Caller-correctable errors, as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<StorageError> for WorkoutError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Integrity(message) => Self::Integrity(message),
            other => Self::Storage(other),
        }
    }
}

/// Convenience type alias for lifecycle results.
pub type WorkoutResult<T> = Result<T, WorkoutError>;
