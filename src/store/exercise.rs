//! Exercise catalog trait.
//!
//! The catalog is maintained by another part of the system; workouts only
//! resolve ids against it.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::exercise::{Exercise, ExerciseId, UserId};

use super::error::StorageResult;

/// Read-only view of the exercise catalog.
#[async_trait]
pub trait ExerciseCatalog: Send + Sync {
    /// Resolve a single exercise. Returns `Ok(None)` if it does not exist.
    async fn find_by_id(&self, id: ExerciseId) -> StorageResult<Option<Exercise>>;

    /// Batch-resolve exercises. Unknown ids are simply absent from the map.
    async fn find_many(&self, ids: &[ExerciseId]) -> StorageResult<HashMap<ExerciseId, Exercise>>;

    /// Exercises owned by any of `owners`, ordered by name.
    async fn list_owned_by(&self, owners: &[UserId]) -> StorageResult<Vec<Exercise>>;
}
