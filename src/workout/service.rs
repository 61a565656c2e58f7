//! Session lifecycle: start, finish, delete and the read paths around them.
//!
//! Every mutation runs under the session's [`KeyedLocks`] entry, commits to
//! storage, and only then pushes to analytics. The analytics outcome is
//! dropped on purpose at each call site.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::analytics::{AnalyticsSync, SyncOutcome, SyncResult};
use crate::exercise::{Exercise, ExerciseAccess, ExerciseId, UserId};
use crate::store::{ExerciseCatalog, SessionStore, SetStore};
use crate::sync::KeyedLocks;

use super::error::{WorkoutError, WorkoutResult};
use super::grouping::{ExerciseBlock, group_into_blocks, referenced_exercises};
use super::model::{ExercisePayload, NewSet, Session, SessionId, WorkoutSet};

/// A session with its sets and the exercises they reference.
#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub session: Session,
    pub sets: Vec<WorkoutSet>,
    pub exercises: HashMap<ExerciseId, Exercise>,
}

impl SessionDetails {
    /// Sets grouped into display blocks.
    pub fn blocks(&self) -> Vec<ExerciseBlock<'_>> {
        group_into_blocks(&self.sets, &self.exercises)
    }
}

/// Orchestrates the workout session lifecycle.
#[derive(Clone)]
pub struct WorkoutService {
    sessions: Arc<dyn SessionStore>,
    sets: Arc<dyn SetStore>,
    catalog: Arc<dyn ExerciseCatalog>,
    analytics: AnalyticsSync,
    access: ExerciseAccess,
    locks: KeyedLocks,
}

impl WorkoutService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        sets: Arc<dyn SetStore>,
        catalog: Arc<dyn ExerciseCatalog>,
        analytics: AnalyticsSync,
        access: ExerciseAccess,
        locks: KeyedLocks,
    ) -> Self {
        Self {
            sessions,
            sets,
            catalog,
            analytics,
            access,
            locks,
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Begin a new in-progress session for `user`.
    pub async fn start(&self, user: UserId) -> WorkoutResult<Session> {
        let session = Session::start(user, Utc::now());
        self.sessions.create(&session).await?;
        info!(session_id = %session.id, user_id = %user, "Workout started");
        Ok(session)
    }

    /// Finish without touching the sets.
    ///
    /// Fails with [`WorkoutError::AlreadyFinished`] on a finished session.
    pub async fn finish_simple(&self, id: SessionId, user: UserId) -> WorkoutResult<Session> {
        let lock = self.locks.get(id);
        let _guard = lock.lock().await;

        let mut session = self.load_owned(id, user).await?;
        if !session.finish(Utc::now()) {
            return Err(WorkoutError::AlreadyFinished);
        }
        self.sessions.save(&session).await?;
        info!(session_id = %id, "Workout finished");

        let _ = self.push(&session).await;
        Ok(session)
    }

    /// Finish with the complete list of performed exercises.
    ///
    /// A non-empty `payload` replaces every stored set of the session. The
    /// payload is validated in full before anything is written, and the new
    /// set list is stored together with the finished state in one write. A
    /// rejected payload or a failed write leaves both the sets and the status
    /// as they were. Finishing again is allowed: the sets are replaced and
    /// pushed again while `finished_at` keeps its first value.
    pub async fn finish_with_sets(
        &self,
        id: SessionId,
        user: UserId,
        payload: Option<&[ExercisePayload]>,
    ) -> WorkoutResult<Session> {
        let lock = self.locks.get(id);
        let _guard = lock.lock().await;

        let mut session = self.load_owned(id, user).await?;

        let new_sets = match payload {
            Some(blocks) if !blocks.is_empty() => Some(self.build_sets(blocks, user).await?),
            _ => None,
        };

        let newly_finished = session.finish(Utc::now());
        match new_sets {
            Some(new_sets) => {
                let stored = self.sets.replace_sets_and_save(&session, new_sets).await?;
                info!(session_id = %id, sets = stored.len(), "Workout sets replaced");
            }
            None if newly_finished => self.sessions.save(&session).await?,
            None => {}
        }
        if newly_finished {
            info!(session_id = %id, "Workout finished");
        }

        let _ = self.push(&session).await;
        Ok(session)
    }

    /// Finish with no payload, degrading to [`finish_simple`](Self::finish_simple)
    /// if that fails.
    pub async fn finish_with_fallback(
        &self,
        id: SessionId,
        user: UserId,
    ) -> WorkoutResult<Session> {
        match self.finish_with_sets(id, user, None).await {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(session_id = %id, error = %e, "Finish failed, retrying as simple finish");
                self.finish_simple(id, user).await
            }
        }
    }

    /// Delete a session and all of its sets, then tell analytics.
    pub async fn delete(&self, id: SessionId, user: UserId) -> WorkoutResult<()> {
        let lock = self.locks.get(id);
        let _guard = lock.lock().await;

        self.load_owned(id, user).await?;
        self.sessions.delete(id).await?;
        info!(session_id = %id, "Workout deleted");

        let _ = self.analytics.delete_workout(id).await;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// The caller's sessions, newest first.
    pub async fn history(&self, user: UserId) -> WorkoutResult<Vec<Session>> {
        Ok(self.sessions.list_by_user(user).await?)
    }

    /// Ownership-checked read of a session with its sets and exercises.
    pub async fn details(&self, id: SessionId, user: UserId) -> WorkoutResult<SessionDetails> {
        let session = self.load_owned(id, user).await?;
        let sets = self.sets.list_sets(id).await?;
        let exercises = self
            .catalog
            .find_many(&referenced_exercises(&sets))
            .await?;
        Ok(SessionDetails {
            session,
            sets,
            exercises,
        })
    }

    /// Exercises the caller may put in a workout, ordered by name.
    pub async fn available_exercises(&self, user: UserId) -> WorkoutResult<Vec<Exercise>> {
        Ok(self
            .catalog
            .list_owned_by(&self.access.visible_owners(user))
            .await?)
    }

    /// Push the catalog's current view of one exercise to analytics, or
    /// remove it there when the catalog no longer has it.
    pub async fn resync_exercise(&self, id: ExerciseId) -> WorkoutResult<SyncResult> {
        Ok(match self.catalog.find_by_id(id).await? {
            Some(exercise) => self.analytics.sync_exercise(&exercise).await,
            None => self.analytics.delete_exercise(id).await,
        })
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Load a session owned by `user`. Foreign sessions read as missing.
    async fn load_owned(&self, id: SessionId, user: UserId) -> WorkoutResult<Session> {
        match self.sessions.load(id).await? {
            Some(session) if session.user_id == user => Ok(session),
            _ => Err(WorkoutError::NotFound),
        }
    }

    /// Validate a finish payload and turn it into insertable sets.
    ///
    /// Blocks without an exercise id are skipped. A block whose raw set list
    /// is non-empty takes the next `exercise_order` slot even when every set
    /// in it is dropped for having no load.
    async fn build_sets(
        &self,
        blocks: &[ExercisePayload],
        user: UserId,
    ) -> WorkoutResult<Vec<NewSet>> {
        let ids: Vec<ExerciseId> = blocks.iter().filter_map(|b| b.exercise_id).collect();
        let exercises = self.catalog.find_many(&ids).await?;

        let mut new_sets = Vec::new();
        let mut exercise_order = 0;
        for block in blocks {
            let Some(exercise_id) = block.exercise_id else {
                continue;
            };
            let exercise = exercises.get(&exercise_id).ok_or_else(|| {
                WorkoutError::validation(format!("Exercise not found: {exercise_id}"))
            })?;
            if !self.access.can_use(exercise, user) {
                return Err(WorkoutError::validation("Exercise not accessible"));
            }

            let raw = block.sets.as_deref().unwrap_or_default();
            if raw.is_empty() {
                continue;
            }
            new_sets.extend(
                raw.iter()
                    .flatten()
                    .filter_map(|set| set.to_new_set(exercise_id, exercise_order)),
            );
            exercise_order += 1;
        }
        Ok(new_sets)
    }

    /// Reload the session's sets and push both to analytics.
    async fn push(&self, session: &Session) -> SyncResult {
        match self.sets.list_sets(session.id).await {
            Ok(sets) => self.analytics.sync_workout(session, &sets).await,
            Err(e) => {
                // Nothing consistent to push; the next mutation will resync.
                warn!(session_id = %session.id, error = %e, "Could not reload sets for analytics push");
                Ok(SyncOutcome::Skipped)
            }
        }
    }
}
