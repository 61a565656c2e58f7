//! Wire types of the HTTP API.
//!
//! Domain types stay free of presentation concerns; handlers convert into
//! these before serializing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exercise::{Equipment, Exercise, ExerciseId, MuscleGroup};
use crate::workout::{
    ExerciseBlock, ExercisePayload, Session, SessionDetails, SessionId, SessionStatus,
    SetGroupType, WorkoutSet,
};

// ============================================================================
// Workout Types
// ============================================================================

/// A session without its sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: SessionId,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id,
            status: session.status(),
            started_at: session.started_at,
            finished_at: session.finished_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWorkoutsResponse {
    pub workouts: Vec<SessionResponse>,
}

/// A session with its sets grouped into exercise blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutDetailResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub blocks: Vec<BlockResponse>,
}

impl From<&SessionDetails> for WorkoutDetailResponse {
    fn from(details: &SessionDetails) -> Self {
        Self {
            session: SessionResponse::from(&details.session),
            blocks: details.blocks().iter().map(BlockResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockResponse {
    pub exercise: ExerciseResponse,
    pub sets: Vec<SetResponse>,
}

impl From<&ExerciseBlock<'_>> for BlockResponse {
    fn from(block: &ExerciseBlock<'_>) -> Self {
        Self {
            exercise: ExerciseResponse::from(block.exercise),
            sets: block.sets.iter().map(SetResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetResponse {
    pub id: String,
    pub reps: i32,
    pub weight: Decimal,
    pub warmup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<SetGroupType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_number: Option<i32>,
}

impl From<&WorkoutSet> for SetResponse {
    fn from(set: &WorkoutSet) -> Self {
        Self {
            id: set.id.to_string(),
            reps: set.reps,
            weight: set.weight,
            warmup: set.warmup,
            group_id: set.group_id,
            group_type: set.group_type,
            group_order: set.group_order,
            set_number: set.set_number,
        }
    }
}

/// Body of `POST /api/v1/workouts/{id}/finish`.
///
/// An absent `exercises` field finishes without touching the sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinishWorkoutRequest {
    #[serde(default)]
    pub exercises: Option<Vec<ExercisePayload>>,
}

// ============================================================================
// Exercise Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseResponse {
    pub id: ExerciseId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_muscle: Option<MuscleGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Equipment>,
}

impl From<&Exercise> for ExerciseResponse {
    fn from(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id,
            name: exercise.name.clone(),
            primary_muscle: exercise.attributes.primary_muscle,
            equipment: exercise.attributes.equipment,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListExercisesResponse {
    pub exercises: Vec<ExerciseResponse>,
}

// ============================================================================
// Admin Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunJobResponse {
    pub job: String,
    pub status: String,
}

/// Outcome of an on-demand exercise sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResyncExerciseResponse {
    pub exercise_id: ExerciseId,
    /// `applied`, `skipped`, `already_absent` or `failed`.
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{ExerciseAttributes, SYSTEM_OWNER_ID};
    use std::collections::HashMap;
    use ulid::Ulid;

    fn set(exercise_id: ExerciseId, exercise_order: i32) -> WorkoutSet {
        WorkoutSet {
            id: Ulid::new(),
            session_id: Uuid::nil(),
            exercise_id,
            reps: 8,
            weight: Decimal::from(60),
            warmup: false,
            group_id: None,
            group_type: None,
            group_order: None,
            set_number: Some(1),
            exercise_order,
        }
    }

    #[test]
    fn in_progress_session_omits_finished_at() {
        let session = Session::start(Uuid::new_v4(), Utc::now());
        let json = serde_json::to_value(SessionResponse::from(&session)).unwrap();

        assert_eq!(json["status"], "IN_PROGRESS");
        assert!(json.get("finished_at").is_none());
    }

    #[test]
    fn detail_response_flattens_session_and_groups_blocks() {
        let squat = Exercise {
            id: Uuid::new_v4(),
            owner_id: SYSTEM_OWNER_ID,
            name: "Squat".to_string(),
            attributes: ExerciseAttributes::default(),
        };
        let mut session = Session::start(Uuid::new_v4(), Utc::now());
        session.finish(Utc::now());
        let details = SessionDetails {
            session,
            sets: vec![set(squat.id, 0), set(squat.id, 0)],
            exercises: HashMap::from([(squat.id, squat.clone())]),
        };

        let json = serde_json::to_value(WorkoutDetailResponse::from(&details)).unwrap();

        assert_eq!(json["status"], "FINISHED");
        assert!(json["finished_at"].is_string());
        assert_eq!(json["blocks"].as_array().unwrap().len(), 1);
        assert_eq!(json["blocks"][0]["exercise"]["name"], "Squat");
        assert_eq!(json["blocks"][0]["sets"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn finish_request_without_exercises_is_none() {
        let req: FinishWorkoutRequest = serde_json::from_str("{}").unwrap();
        assert!(req.exercises.is_none());

        let req: FinishWorkoutRequest = serde_json::from_str(r#"{"exercises": []}"#).unwrap();
        assert_eq!(req.exercises.map(|e| e.len()), Some(0));
    }
}
