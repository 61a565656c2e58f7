//! Exercise catalog HTTP handlers.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use super::workouts::workout_error;
use crate::api::{ExerciseResponse, ListExercisesResponse};
use crate::handlers::identity::Caller;
use crate::server::AppState;

/// GET /api/v1/exercises
///
/// Exercises the caller may reference when finishing a workout.
pub async fn list_exercises(State(state): State<AppState>, Caller(user): Caller) -> Response {
    match state.workouts.available_exercises(user).await {
        Ok(exercises) => Json(ListExercisesResponse {
            exercises: exercises.iter().map(ExerciseResponse::from).collect(),
        })
        .into_response(),
        Err(e) => workout_error(e, "failed to list exercises"),
    }
}
