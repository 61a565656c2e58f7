//! Set storage trait.

use async_trait::async_trait;

use crate::workout::{NewSet, Session, SessionId, WorkoutSet};

use super::error::StorageResult;

/// Storage interface for the sets owned by a session.
#[async_trait]
pub trait SetStore: Send + Sync {
    /// Load a session's sets ordered by `(exercise_order, id)`.
    ///
    /// Sets sharing an `exercise_order` come back in insertion order.
    async fn list_sets(&self, session_id: SessionId) -> StorageResult<Vec<WorkoutSet>>;

    /// Replace every set of `session` and persist `session` itself in one
    /// atomic write.
    ///
    /// Ids are allocated in the order given. Returns the stored sets.
    /// Either both the new set list and the session state are stored, or
    /// neither is. Fails with
    /// [`StorageError::Integrity`](super::StorageError::Integrity) if the
    /// session does not exist.
    async fn replace_sets_and_save(
        &self,
        session: &Session,
        sets: Vec<NewSet>,
    ) -> StorageResult<Vec<WorkoutSet>>;
}
