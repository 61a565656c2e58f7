//! Workout session HTTP handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path as PathExtract, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use uuid::Uuid;

use crate::api::{
    FinishWorkoutRequest, ListWorkoutsResponse, SessionResponse, WorkoutDetailResponse,
};
use crate::handlers::identity::Caller;
use crate::handlers::problem_details;
use crate::server::AppState;
use crate::workout::{SessionId, WorkoutError};

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/workouts
pub async fn list_workouts(State(state): State<AppState>, Caller(user): Caller) -> Response {
    match state.workouts.history(user).await {
        Ok(sessions) => Json(ListWorkoutsResponse {
            workouts: sessions.iter().map(SessionResponse::from).collect(),
        })
        .into_response(),
        Err(e) => workout_error(e, "failed to list workouts"),
    }
}

/// POST /api/v1/workouts
pub async fn start_workout(State(state): State<AppState>, Caller(user): Caller) -> Response {
    match state.workouts.start(user).await {
        Ok(session) => (StatusCode::CREATED, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => workout_error(e, "failed to start workout"),
    }
}

/// GET /api/v1/workouts/{id}
pub async fn get_workout(
    State(state): State<AppState>,
    Caller(user): Caller,
    PathExtract(id): PathExtract<String>,
) -> Response {
    let Some(id) = parse_session_id(&id) else {
        return session_not_found();
    };

    match state.workouts.details(id, user).await {
        Ok(details) => Json(WorkoutDetailResponse::from(&details)).into_response(),
        Err(e) => workout_error(e, "failed to load workout"),
    }
}

/// DELETE /api/v1/workouts/{id}
pub async fn delete_workout(
    State(state): State<AppState>,
    Caller(user): Caller,
    PathExtract(id): PathExtract<String>,
) -> Response {
    let Some(id) = parse_session_id(&id) else {
        return session_not_found();
    };

    match state.workouts.delete(id, user).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => workout_error(e, "failed to delete workout"),
    }
}

/// POST /api/v1/workouts/{id}/finish
///
/// An empty body or a body without `exercises` finishes with fallback to a
/// simple finish. A body with `exercises` replaces the session's sets.
pub async fn finish_workout(
    State(state): State<AppState>,
    Caller(user): Caller,
    PathExtract(id): PathExtract<String>,
    body: Bytes,
) -> Response {
    let Some(id) = parse_session_id(&id) else {
        return session_not_found();
    };

    let request = if body.iter().all(u8::is_ascii_whitespace) {
        FinishWorkoutRequest::default()
    } else {
        match serde_json::from_slice::<FinishWorkoutRequest>(&body) {
            Ok(req) => req,
            Err(e) => return problem_details::bad_request(format!("invalid request body: {e}")),
        }
    };

    let result = match request.exercises.as_deref() {
        Some(exercises) => {
            state
                .workouts
                .finish_with_sets(id, user, Some(exercises))
                .await
        }
        None => state.workouts.finish_with_fallback(id, user).await,
    };

    match result {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => workout_error(e, "failed to finish workout"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Malformed ids cannot name an existing session.
fn parse_session_id(raw: &str) -> Option<SessionId> {
    Uuid::parse_str(raw).ok()
}

fn session_not_found() -> Response {
    problem_details::not_found("workout session not found")
}

/// Map a lifecycle error to a problem response. Server faults are logged
/// and answered with `context` instead of the underlying message.
pub(super) fn workout_error(err: WorkoutError, context: &str) -> Response {
    match err {
        WorkoutError::NotFound => session_not_found(),
        WorkoutError::Validation(_) | WorkoutError::AlreadyFinished | WorkoutError::Integrity(_) => {
            problem_details::bad_request(err.to_string())
        }
        WorkoutError::Storage(e) => {
            error!(error = %e, "{context}");
            problem_details::internal_error(context)
        }
    }
}
