//! Scheduled removal of sessions that were started and never finished.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::store::{SessionStore, StorageResult};
use crate::sync::KeyedLocks;

use super::model::{Session, SessionId};

/// Default age after which an unfinished session counts as abandoned.
pub const DEFAULT_ABANDON_AFTER_DAYS: i64 = 7;

/// Result of one sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReapReport {
    /// Sessions matching the abandonment rule when the sweep started.
    pub candidates: usize,
    pub removed: Vec<SessionId>,
    /// Candidates that could not be removed; retried on the next sweep.
    pub failed: usize,
}

/// Deletes in-progress sessions older than the abandonment cutoff.
///
/// Removal is local only: the analytics replica is not notified.
#[derive(Clone)]
pub struct AbandonedSessionReaper {
    sessions: Arc<dyn SessionStore>,
    locks: KeyedLocks,
    abandon_after: Duration,
}

impl AbandonedSessionReaper {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        locks: KeyedLocks,
        abandon_after: Duration,
    ) -> Self {
        Self {
            sessions,
            locks,
            abandon_after,
        }
    }

    /// Delete every session abandoned as of `now`, together with its sets.
    ///
    /// Failing to list sessions aborts the sweep. A failure on one session is
    /// logged and the sweep moves on.
    pub async fn sweep(&self, now: DateTime<Utc>) -> StorageResult<ReapReport> {
        let cutoff = now - self.abandon_after;
        let candidates: Vec<Session> = self
            .sessions
            .list()
            .await?
            .into_iter()
            .filter(|s| s.is_abandoned(cutoff))
            .collect();

        let mut report = ReapReport {
            candidates: candidates.len(),
            ..ReapReport::default()
        };

        for candidate in candidates {
            match self.reap_one(candidate.id, cutoff).await {
                Ok(true) => {
                    info!(
                        session_id = %candidate.id,
                        user_id = %candidate.user_id,
                        started_at = %candidate.started_at,
                        "Deleted abandoned workout"
                    );
                    report.removed.push(candidate.id);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(session_id = %candidate.id, error = %e, "Failed to delete abandoned workout");
                    report.failed += 1;
                }
            }
        }

        info!(
            candidates = report.candidates,
            removed = report.removed.len(),
            failed = report.failed,
            "Abandoned workout sweep complete"
        );
        Ok(report)
    }

    /// Re-check under the session lock; a finish may have landed since listing.
    async fn reap_one(&self, id: SessionId, cutoff: DateTime<Utc>) -> StorageResult<bool> {
        let lock = self.locks.get(id);
        let _guard = lock.lock().await;

        match self.sessions.load(id).await? {
            Some(session) if session.is_abandoned(cutoff) => {}
            _ => return Ok(false),
        }

        self.sessions.delete(id).await?;
        Ok(true)
    }
}
