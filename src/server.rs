use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tokio::sync::{Mutex, oneshot};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::scheduler::SchedulerHandle;
use crate::workout::WorkoutService;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub workouts: WorkoutService,
    pub scheduler: Option<SchedulerHandle>,
    pub admin_token: Option<String>,
    pub api_token: Option<String>,
    pub max_connections: usize,
    pub shutdown_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

// ============================================================================
// Server Setup
// ============================================================================

/// Create a shutdown channel pair.
///
/// Returns (sender for AppState, receiver for shutdown_signal).
pub fn shutdown_channel() -> (oneshot::Sender<()>, oneshot::Receiver<()>) {
    oneshot::channel()
}

pub fn build_app(state: AppState, request_timeout_seconds: u64) -> Router {
    let max_connections = state.max_connections;

    let api_routes = Router::new()
        .route(
            "/workouts",
            get(handlers::v1::list_workouts).post(handlers::v1::start_workout),
        )
        .route(
            "/workouts/{id}",
            get(handlers::v1::get_workout).delete(handlers::v1::delete_workout),
        )
        .route("/workouts/{id}/finish", post(handlers::v1::finish_workout))
        .route("/exercises", get(handlers::v1::list_exercises))
        .with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_seconds),
        ));

    let api_v1 = Router::new()
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024)) // 2 MB
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::api_auth::require_api_token,
        ))
        .layer(ConcurrencyLimitLayer::new(max_connections));

    // Admin routes (no timeout; a run-now trigger may wait on the scheduler)
    let admin_routes = Router::new()
        .route("/shutdown", post(handlers::shutdown))
        .route("/jobs/{name}/run", post(handlers::run_job))
        .route("/exercises/{id}/sync", post(handlers::resync_exercise))
        .with_state(state.clone());

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .with_state(state)
        .nest("/api/v1", api_v1)
        .nest("/api/admin/v1", admin_routes)
        .layer(TraceLayer::new_for_http())
}
