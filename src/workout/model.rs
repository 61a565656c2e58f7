//! Workout domain types.
//!
//! A [`Session`] moves through exactly one transition, `IN_PROGRESS` to
//! `FINISHED`. The finish timestamp lives inside [`SessionState::Finished`]
//! so a session cannot carry one without the other.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;
use uuid::Uuid;

use crate::exercise::{ExerciseId, UserId};

/// Identifier of a workout session.
pub type SessionId = Uuid;

/// Identifier of a persisted set. Allocated monotonically by the store, so
/// id order is insertion order.
pub type SetId = Ulid;

// ============================================================================
// Session
// ============================================================================

/// Status tag as exposed on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    InProgress,
    Finished,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Finished { finished_at: DateTime<Utc> },
}

/// One workout occurrence owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SessionDocument", try_from = "SessionDocument")]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
    state: SessionState,
}

impl Session {
    /// Begin a new in-progress session.
    pub fn start(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            started_at: now,
            state: SessionState::InProgress,
        }
    }

    /// Rebuild a session from stored parts.
    pub fn from_parts(
        id: SessionId,
        user_id: UserId,
        started_at: DateTime<Utc>,
        state: SessionState,
    ) -> Self {
        Self {
            id,
            user_id,
            started_at,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::InProgress => SessionStatus::InProgress,
            SessionState::Finished { .. } => SessionStatus::Finished,
        }
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SessionState::InProgress => None,
            SessionState::Finished { finished_at } => Some(finished_at),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished { .. })
    }

    /// Apply the `IN_PROGRESS -> FINISHED` transition.
    ///
    /// Returns `false` and leaves the original timestamp untouched if the
    /// session is already finished.
    pub fn finish(&mut self, at: DateTime<Utc>) -> bool {
        match self.state {
            SessionState::InProgress => {
                self.state = SessionState::Finished { finished_at: at };
                true
            }
            SessionState::Finished { .. } => false,
        }
    }

    /// Whether this session has been left in progress since before `cutoff`.
    pub fn is_abandoned(&self, cutoff: DateTime<Utc>) -> bool {
        self.status() == SessionStatus::InProgress
            && self.finished_at().is_none()
            && self.started_at < cutoff
    }
}

/// Flat persisted/wire form of a [`Session`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionDocument {
    id: SessionId,
    user_id: UserId,
    started_at: DateTime<Utc>,
    #[serde(default)]
    finished_at: Option<DateTime<Utc>>,
    status: SessionStatus,
}

/// A stored session whose status tag disagrees with its finish timestamp.
#[derive(Debug, Error)]
#[error("session {id}: status {status:?} is inconsistent with finished_at")]
pub struct InconsistentSession {
    id: SessionId,
    status: SessionStatus,
}

impl From<Session> for SessionDocument {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            user_id: session.user_id,
            started_at: session.started_at,
            finished_at: session.finished_at(),
            status: session.status(),
        }
    }
}

impl TryFrom<SessionDocument> for Session {
    type Error = InconsistentSession;

    fn try_from(doc: SessionDocument) -> Result<Self, Self::Error> {
        let state = match (doc.status, doc.finished_at) {
            (SessionStatus::InProgress, None) => SessionState::InProgress,
            (SessionStatus::Finished, Some(finished_at)) => SessionState::Finished { finished_at },
            (status, _) => return Err(InconsistentSession { id: doc.id, status }),
        };
        Ok(Self::from_parts(doc.id, doc.user_id, doc.started_at, state))
    }
}

// ============================================================================
// Sets
// ============================================================================

/// Client-supplied grouping tag. Opaque to the lifecycle logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetGroupType {
    Superset,
    DropSet,
    Circuit,
}

/// One recorded performance of an exercise within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: SetId,
    pub session_id: SessionId,
    pub exercise_id: ExerciseId,
    pub reps: i32,
    pub weight: Decimal,
    #[serde(default)]
    pub warmup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<SetGroupType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_number: Option<i32>,
    pub exercise_order: i32,
}

/// A set accepted for insertion; the store assigns `id` and `session_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSet {
    pub exercise_id: ExerciseId,
    pub reps: i32,
    pub weight: Decimal,
    pub warmup: bool,
    pub group_id: Option<Uuid>,
    pub group_type: Option<SetGroupType>,
    pub group_order: Option<i32>,
    pub set_number: Option<i32>,
    pub exercise_order: i32,
}

impl NewSet {
    pub fn into_set(self, id: SetId, session_id: SessionId) -> WorkoutSet {
        WorkoutSet {
            id,
            session_id,
            exercise_id: self.exercise_id,
            reps: self.reps,
            weight: self.weight,
            warmup: self.warmup,
            group_id: self.group_id,
            group_type: self.group_type,
            group_order: self.group_order,
            set_number: self.set_number,
            exercise_order: self.exercise_order,
        }
    }
}

// ============================================================================
// Finish payload
// ============================================================================

/// One exercise block of a finish request, in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExercisePayload {
    /// Blocks without an exercise id are skipped.
    #[serde(default)]
    pub exercise_id: Option<ExerciseId>,
    /// Null entries are skipped but still make the list non-empty.
    #[serde(default)]
    pub sets: Option<Vec<Option<SetPayload>>>,
}

/// One set of a finish request as submitted by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetPayload {
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub group_type: Option<SetGroupType>,
    #[serde(default)]
    pub group_order: Option<i32>,
    #[serde(default)]
    pub set_number: Option<i32>,
}

impl SetPayload {
    /// Reps and weight clamped at zero, or `None` when either ends up zero.
    pub fn effective_load(&self) -> Option<(i32, Decimal)> {
        let reps = self.reps.unwrap_or(0).max(0);
        let weight = self.weight.unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
        (reps > 0 && weight > Decimal::ZERO).then_some((reps, weight))
    }

    /// Build the insertable set, dropping it when its load is not positive.
    pub fn to_new_set(&self, exercise_id: ExerciseId, exercise_order: i32) -> Option<NewSet> {
        let (reps, weight) = self.effective_load()?;
        Some(NewSet {
            exercise_id,
            reps,
            weight,
            warmup: false,
            group_id: self.group_id,
            group_type: self.group_type,
            group_order: self.group_order,
            set_number: self.set_number,
            exercise_order,
        })
    }
}
