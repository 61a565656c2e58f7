//! Write-behind push to the analytics read replica.
//!
//! The replica is eventually consistent and never read from here. There is
//! no retry queue: a dropped push is repaired by the next mutation of the
//! same entity.

mod client;
mod error;
mod http;
mod sync;
mod types;

pub use client::{AnalyticsClient, NoopAnalyticsClient};
pub use error::{AnalyticsError, Result};
pub use http::HttpAnalyticsClient;
pub use sync::{AnalyticsSync, SyncFailure, SyncOp, SyncOutcome, SyncResult};
pub use types::{ExerciseSyncRequest, WorkoutSetSyncRequest, WorkoutSyncRequest};

#[cfg(test)]
pub(crate) use client::testing;
