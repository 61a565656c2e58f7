//! Best-effort push of domain changes to the analytics replica.
//!
//! Every operation returns a [`SyncResult`] that callers may inspect or drop.
//! Nothing here ever propagates an error or a panic: by the time a sync runs
//! the primary mutation has already committed.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::exercise::{Exercise, ExerciseId};
use crate::workout::{Session, SessionId, WorkoutSet};

use super::client::AnalyticsClient;
use super::error::AnalyticsError;
use super::types::{ExerciseSyncRequest, WorkoutSyncRequest};

/// What happened to a sync that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The replica accepted the change.
    Applied,
    /// Nothing to send (nil id).
    Skipped,
    /// A delete found nothing to delete; the replica is already consistent.
    AlreadyAbsent,
}

/// A sync that was dropped. Already logged when returned.
#[derive(Debug, Error)]
pub enum SyncFailure {
    #[error("{op} {id} rejected: {source}")]
    Remote {
        op: SyncOp,
        id: Uuid,
        #[source]
        source: AnalyticsError,
    },

    #[error("{op} {id} failed unexpectedly: {message}")]
    Unexpected { op: SyncOp, id: Uuid, message: String },
}

pub type SyncResult = Result<SyncOutcome, SyncFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    PushExercise,
    DeleteExercise,
    PushWorkout,
    DeleteWorkout,
}

impl SyncOp {
    fn is_delete(self) -> bool {
        matches!(self, Self::DeleteExercise | Self::DeleteWorkout)
    }
}

impl fmt::Display for SyncOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PushExercise => "push exercise",
            Self::DeleteExercise => "delete exercise",
            Self::PushWorkout => "push workout",
            Self::DeleteWorkout => "delete workout",
        })
    }
}

/// Failure-swallowing adapter over an [`AnalyticsClient`].
#[derive(Clone)]
pub struct AnalyticsSync {
    client: Arc<dyn AnalyticsClient>,
}

impl AnalyticsSync {
    pub fn new(client: Arc<dyn AnalyticsClient>) -> Self {
        Self { client }
    }

    pub async fn sync_exercise(&self, exercise: &Exercise) -> SyncResult {
        if exercise.id.is_nil() {
            return Ok(SyncOutcome::Skipped);
        }
        let batch = [ExerciseSyncRequest::from(exercise)];
        self.guarded(
            SyncOp::PushExercise,
            exercise.id,
            self.client.push_exercises(&batch),
        )
        .await
    }

    pub async fn delete_exercise(&self, id: ExerciseId) -> SyncResult {
        if id.is_nil() {
            return Ok(SyncOutcome::Skipped);
        }
        self.guarded(SyncOp::DeleteExercise, id, self.client.delete_exercise(id))
            .await
    }

    /// Push a session together with its complete current set list.
    pub async fn sync_workout(&self, session: &Session, sets: &[WorkoutSet]) -> SyncResult {
        if session.id.is_nil() {
            return Ok(SyncOutcome::Skipped);
        }
        let request = WorkoutSyncRequest::new(session, sets);
        self.guarded(
            SyncOp::PushWorkout,
            session.id,
            self.client.push_workout(&request),
        )
        .await
    }

    pub async fn delete_workout(&self, id: SessionId) -> SyncResult {
        if id.is_nil() {
            return Ok(SyncOutcome::Skipped);
        }
        self.guarded(SyncOp::DeleteWorkout, id, self.client.delete_workout(id))
            .await
    }

    async fn guarded<F>(&self, op: SyncOp, id: Uuid, call: F) -> SyncResult
    where
        F: Future<Output = Result<(), AnalyticsError>>,
    {
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(())) => {
                debug!(%id, "Analytics {op} succeeded");
                Ok(SyncOutcome::Applied)
            }
            Ok(Err(AnalyticsError::NotFound)) if op.is_delete() => {
                debug!(%id, "Analytics {op}: already absent");
                Ok(SyncOutcome::AlreadyAbsent)
            }
            Ok(Err(source)) => {
                warn!(%id, error = %source, "Analytics {op} failed");
                Err(SyncFailure::Remote { op, id, source })
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(%id, error = %message, "Analytics {op} failed unexpectedly");
                Err(SyncFailure::Unexpected { op, id, message })
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{Call, RecordingClient, Reply};
    use crate::exercise::{ExerciseAttributes, SYSTEM_OWNER_ID};
    use chrono::Utc;

    fn sync_with(client: &Arc<RecordingClient>) -> AnalyticsSync {
        AnalyticsSync::new(client.clone())
    }

    fn exercise(id: Uuid) -> Exercise {
        Exercise {
            id,
            owner_id: SYSTEM_OWNER_ID,
            name: "Row".to_string(),
            attributes: ExerciseAttributes::default(),
        }
    }

    #[tokio::test]
    async fn nil_ids_make_no_remote_call() {
        let client = Arc::new(RecordingClient::new());
        let sync = sync_with(&client);

        assert_eq!(sync.delete_workout(Uuid::nil()).await.unwrap(), SyncOutcome::Skipped);
        assert_eq!(sync.delete_exercise(Uuid::nil()).await.unwrap(), SyncOutcome::Skipped);
        assert_eq!(
            sync.sync_exercise(&exercise(Uuid::nil())).await.unwrap(),
            SyncOutcome::Skipped
        );
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn successful_push_is_recorded() {
        let client = Arc::new(RecordingClient::new());
        let sync = sync_with(&client);
        let session = Session::start(Uuid::new_v4(), Utc::now());

        let outcome = sync.sync_workout(&session, &[]).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Applied);
        assert_eq!(client.pushed_workouts().len(), 1);
        assert_eq!(client.pushed_workouts()[0].id, session.id);
    }

    #[tokio::test]
    async fn not_found_on_delete_is_already_absent() {
        let client = Arc::new(RecordingClient::replying(Reply::NotFound));
        let sync = sync_with(&client);

        let outcome = sync.delete_workout(Uuid::new_v4()).await.unwrap();
        assert_eq!(outcome, SyncOutcome::AlreadyAbsent);
    }

    #[tokio::test]
    async fn not_found_on_push_is_a_failure() {
        let client = Arc::new(RecordingClient::replying(Reply::NotFound));
        let sync = sync_with(&client);

        let err = sync.sync_exercise(&exercise(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(
            err,
            SyncFailure::Remote {
                op: SyncOp::PushExercise,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn remote_failure_is_returned_not_raised() {
        let client = Arc::new(RecordingClient::replying(Reply::Unavailable));
        let sync = sync_with(&client);
        let id = Uuid::new_v4();

        let err = sync.delete_exercise(id).await.unwrap_err();
        assert!(matches!(err, SyncFailure::Remote { id: failed, .. } if failed == id));
        assert_eq!(client.calls(), vec![Call::DeleteExercise(id)]);
    }

    #[tokio::test]
    async fn panicking_client_is_contained() {
        let client = Arc::new(RecordingClient::replying(Reply::Panic));
        let sync = sync_with(&client);
        let session = Session::start(Uuid::new_v4(), Utc::now());

        let err = sync.sync_workout(&session, &[]).await.unwrap_err();
        match err {
            SyncFailure::Unexpected { message, .. } => {
                assert!(message.contains("blew up"));
            }
            other => panic!("expected unexpected failure, got {other:?}"),
        }
    }
}
