//! Session storage trait.

use async_trait::async_trait;

use crate::exercise::UserId;
use crate::workout::{Session, SessionId};

use super::error::StorageResult;

/// Storage interface for workout sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a brand-new session.
    ///
    /// Fails with [`StorageError::Integrity`](super::StorageError::Integrity)
    /// if a session with the same id already exists.
    async fn create(&self, session: &Session) -> StorageResult<()>;

    /// Load a session by id. Returns `Ok(None)` if it does not exist.
    async fn load(&self, id: SessionId) -> StorageResult<Option<Session>>;

    /// Overwrite an existing session. Must be atomic.
    async fn save(&self, session: &Session) -> StorageResult<()>;

    /// Delete a session together with its sets, in one step. Deleting a
    /// missing session is a no-op.
    async fn delete(&self, id: SessionId) -> StorageResult<()>;

    /// List every stored session, in no particular order. Entries that
    /// cannot be read are skipped.
    async fn list(&self) -> StorageResult<Vec<Session>>;

    /// List sessions owned by `user_id`, newest `started_at` first.
    async fn list_by_user(&self, user_id: UserId) -> StorageResult<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .list()
            .await?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }
}
