//! Admin handlers for server management.
//!
//! Authorization (checked per handler):
//! - If `admin_token` is configured: requires `Authorization: Bearer <token>` header
//! - If `admin_token` is not configured: only accepts requests from localhost

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Path as PathExtract, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{error, info};
use uuid::Uuid;

use super::{api_auth, problem_details};
use crate::analytics::SyncOutcome;
use crate::api::{ResyncExerciseResponse, RunJobResponse};
use crate::scheduler::SchedulerError;
use crate::server::AppState;

fn deny() -> Response {
    (StatusCode::FORBIDDEN, "Admin access denied").into_response()
}

/// POST /api/admin/v1/shutdown
///
/// Triggers a graceful server shutdown.
pub async fn shutdown(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !api_auth::is_authorized(&state.admin_token, &addr, &headers) {
        return deny();
    }

    if let Some(tx) = state.shutdown_tx.lock().await.take() {
        let _ = tx.send(());
        (StatusCode::OK, "Shutdown initiated").into_response()
    } else {
        (StatusCode::CONFLICT, "Shutdown already in progress").into_response()
    }
}

/// POST /api/admin/v1/jobs/{name}/run
///
/// Dispatches a scheduled job outside its cadence. Returns once the run is
/// queued; the outcome goes to the log.
pub async fn run_job(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    PathExtract(name): PathExtract<String>,
) -> Response {
    if !api_auth::is_authorized(&state.admin_token, &addr, &headers) {
        return deny();
    }

    let Some(scheduler) = &state.scheduler else {
        return problem_details::service_unavailable("scheduler is disabled");
    };

    match scheduler.trigger(&name).await {
        Ok(()) => {
            info!(job = %name, "Job run requested");
            (
                StatusCode::ACCEPTED,
                Json(RunJobResponse {
                    job: name,
                    status: "dispatched".to_string(),
                }),
            )
                .into_response()
        }
        Err(SchedulerError::NotFound(name)) => {
            problem_details::not_found(format!("job '{name}' not found"))
        }
        Err(SchedulerError::ShutDown) => {
            problem_details::service_unavailable("scheduler is shutting down")
        }
        Err(e) => {
            error!(job = %name, error = %e, "Failed to trigger job");
            problem_details::internal_error("failed to trigger job")
        }
    }
}

/// POST /api/admin/v1/exercises/{id}/sync
///
/// Pushes the catalog's current view of an exercise to analytics, or removes
/// it there once the catalog no longer has it.
pub async fn resync_exercise(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    PathExtract(id): PathExtract<String>,
) -> Response {
    if !api_auth::is_authorized(&state.admin_token, &addr, &headers) {
        return deny();
    }

    let Ok(exercise_id) = Uuid::parse_str(&id) else {
        return problem_details::bad_request(format!("invalid exercise id '{id}'"));
    };

    let result = match state.workouts.resync_exercise(exercise_id).await {
        Ok(result) => result,
        Err(e) => {
            error!(exercise_id = %exercise_id, error = %e, "Failed to read exercise catalog");
            return problem_details::internal_error("failed to read exercise catalog");
        }
    };

    let (outcome, error) = match result {
        Ok(SyncOutcome::Applied) => ("applied", None),
        Ok(SyncOutcome::Skipped) => ("skipped", None),
        Ok(SyncOutcome::AlreadyAbsent) => ("already_absent", None),
        Err(failure) => ("failed", Some(failure.to_string())),
    };

    Json(ResyncExerciseResponse {
        exercise_id,
        outcome: outcome.to_string(),
        error,
    })
    .into_response()
}
