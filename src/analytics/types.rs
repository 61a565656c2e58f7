//! Wire types pushed to the analytics replica.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exercise::{Equipment, Exercise, ExerciseId, MuscleGroup, UserId};
use crate::workout::{Session, SessionId, SessionStatus, SetGroupType, SetId, WorkoutSet};

/// Body element of `POST /internal/exercises`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSyncRequest {
    pub id: ExerciseId,
    pub owner_user_id: UserId,
    pub name: String,
    pub primary_muscle: Option<MuscleGroup>,
    pub equipment: Option<Equipment>,
    pub created_on: Option<DateTime<Utc>>,
}

impl From<&Exercise> for ExerciseSyncRequest {
    fn from(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id,
            owner_user_id: exercise.owner_id,
            name: exercise.name.clone(),
            primary_muscle: exercise.attributes.primary_muscle,
            equipment: exercise.attributes.equipment,
            created_on: exercise.attributes.created_on,
        }
    }
}

/// Body of `POST /internal/workouts`. Carries the full current set list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSyncRequest {
    pub id: SessionId,
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub sets: Vec<WorkoutSetSyncRequest>,
}

impl WorkoutSyncRequest {
    pub fn new(session: &Session, sets: &[WorkoutSet]) -> Self {
        Self {
            id: session.id,
            user_id: session.user_id,
            started_at: session.started_at,
            finished_at: session.finished_at(),
            status: session.status(),
            sets: sets.iter().map(WorkoutSetSyncRequest::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSetSyncRequest {
    pub id: SetId,
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

impl From<&WorkoutSet> for WorkoutSetSyncRequest {
    fn from(set: &WorkoutSet) -> Self {
        Self {
            id: set.id,
            exercise_id: set.exercise_id,
            reps: set.reps,
            weight: set.weight,
            warmup: set.warmup,
            group_id: set.group_id,
            group_type: set.group_type,
            group_order: set.group_order,
            set_number: set.set_number,
            exercise_order: set.exercise_order,
        }
    }
}
