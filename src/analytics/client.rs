//! Client seam for the analytics replica.

use async_trait::async_trait;

use crate::exercise::ExerciseId;
use crate::workout::SessionId;

use super::error::Result;
use super::types::{ExerciseSyncRequest, WorkoutSyncRequest};

/// Push-only interface to the analytics replica.
///
/// Implementations report failures; swallowing them is the job of
/// [`AnalyticsSync`](super::AnalyticsSync).
#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    async fn push_exercises(&self, exercises: &[ExerciseSyncRequest]) -> Result<()>;

    async fn delete_exercise(&self, id: ExerciseId) -> Result<()>;

    async fn push_workout(&self, workout: &WorkoutSyncRequest) -> Result<()>;

    async fn delete_workout(&self, id: SessionId) -> Result<()>;
}

/// Client used when analytics is disabled. Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalyticsClient;

#[async_trait]
impl AnalyticsClient for NoopAnalyticsClient {
    async fn push_exercises(&self, _exercises: &[ExerciseSyncRequest]) -> Result<()> {
        Ok(())
    }

    async fn delete_exercise(&self, _id: ExerciseId) -> Result<()> {
        Ok(())
    }

    async fn push_workout(&self, _workout: &WorkoutSyncRequest) -> Result<()> {
        Ok(())
    }

    async fn delete_workout(&self, _id: SessionId) -> Result<()> {
        Ok(())
    }
}
