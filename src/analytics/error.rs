//! Analytics client error types.

use thiserror::Error;

/// Errors returned by an [`AnalyticsClient`](super::AnalyticsClient).
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The replica does not know the entity.
    #[error("entity not found in analytics")]
    NotFound,

    /// The replica answered with a non-success status.
    #[error("analytics error ({status}): {message}")]
    Status { status: u16, message: String },

    /// HTTP request failed before a response was received.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for analytics client operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
