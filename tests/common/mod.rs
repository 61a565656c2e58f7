//! Common test utilities.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use ironlog::analytics::{
    AnalyticsClient, AnalyticsSync, ExerciseSyncRequest, Result as AnalyticsResult,
    WorkoutSyncRequest,
};
use ironlog::exercise::{Exercise, ExerciseAccess, ExerciseAttributes, SYSTEM_OWNER_ID, UserId};
use ironlog::server::{self, AppState};
use ironlog::store::file::{FileExerciseCatalog, FileWorkoutStore};
use ironlog::sync::KeyedLocks;
use ironlog::workout::WorkoutService;

// ============================================================================
// Analytics Recorder
// ============================================================================

/// Records every analytics call the app makes.
#[derive(Default)]
pub struct RecordingAnalytics {
    pushed_workouts: StdMutex<Vec<WorkoutSyncRequest>>,
    deleted_workouts: StdMutex<Vec<Uuid>>,
    pushed_exercises: StdMutex<Vec<Uuid>>,
    deleted_exercises: StdMutex<Vec<Uuid>>,
}

impl RecordingAnalytics {
    pub fn pushed_workouts(&self) -> Vec<WorkoutSyncRequest> {
        self.pushed_workouts.lock().unwrap().clone()
    }

    pub fn deleted_workouts(&self) -> Vec<Uuid> {
        self.deleted_workouts.lock().unwrap().clone()
    }

    pub fn pushed_exercises(&self) -> Vec<Uuid> {
        self.pushed_exercises.lock().unwrap().clone()
    }

    pub fn deleted_exercises(&self) -> Vec<Uuid> {
        self.deleted_exercises.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsClient for RecordingAnalytics {
    async fn push_exercises(&self, exercises: &[ExerciseSyncRequest]) -> AnalyticsResult<()> {
        self.pushed_exercises
            .lock()
            .unwrap()
            .extend(exercises.iter().map(|e| e.id));
        Ok(())
    }

    async fn delete_exercise(&self, id: Uuid) -> AnalyticsResult<()> {
        self.deleted_exercises.lock().unwrap().push(id);
        Ok(())
    }

    async fn push_workout(&self, workout: &WorkoutSyncRequest) -> AnalyticsResult<()> {
        self.pushed_workouts.lock().unwrap().push(workout.clone());
        Ok(())
    }

    async fn delete_workout(&self, id: Uuid) -> AnalyticsResult<()> {
        self.deleted_workouts.lock().unwrap().push(id);
        Ok(())
    }
}

// ============================================================================
// Test App
// ============================================================================

/// A router over a temporary data directory with a seeded catalog.
pub struct TestApp {
    pub router: Router,
    pub analytics: Arc<RecordingAnalytics>,
    pub user: UserId,
    /// System-owned exercise any user may reference.
    pub squat: Exercise,
    /// Exercise owned by the test user.
    pub cable_fly: Exercise,
    /// Exercise owned by someone else.
    pub foreign: Exercise,
    _tmp: TempDir,
}

fn exercise(owner: UserId, name: &str) -> Exercise {
    Exercise {
        id: Uuid::new_v4(),
        owner_id: owner,
        name: name.to_string(),
        attributes: ExerciseAttributes::default(),
    }
}

/// Build the app with loopback callers and no tokens configured.
pub async fn test_app() -> TestApp {
    test_app_with(None, "127.0.0.1:40000").await
}

pub async fn test_app_with(api_token: Option<&str>, peer: &str) -> TestApp {
    let tmp = TempDir::new().unwrap();
    let user = Uuid::new_v4();

    let squat = exercise(SYSTEM_OWNER_ID, "Squat");
    let cable_fly = exercise(user, "Cable Fly");
    let foreign = exercise(Uuid::new_v4(), "Hidden Curl");

    let catalog = Arc::new(FileExerciseCatalog::new(tmp.path().join("exercises.yaml")));
    catalog
        .write_all(vec![squat.clone(), cable_fly.clone(), foreign.clone()])
        .await
        .unwrap();

    let store = Arc::new(FileWorkoutStore::new(tmp.path().join("sessions")));
    let analytics = Arc::new(RecordingAnalytics::default());

    let workouts = WorkoutService::new(
        store.clone(),
        store,
        catalog,
        AnalyticsSync::new(analytics.clone()),
        ExerciseAccess::new(SYSTEM_OWNER_ID),
        KeyedLocks::new(),
    );

    let (shutdown_tx, _shutdown_rx) = server::shutdown_channel();
    let state = AppState {
        workouts,
        scheduler: None,
        admin_token: None,
        api_token: api_token.map(str::to_string),
        max_connections: 16,
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };

    let peer: SocketAddr = peer.parse().unwrap();
    let router = server::build_app(state, 30).layer(MockConnectInfo(peer));

    TestApp {
        router,
        analytics,
        user,
        squat,
        cable_fly,
        foreign,
        _tmp: tmp,
    }
}

impl TestApp {
    /// Send a request as `user` and return the status and parsed JSON body
    /// (`Null` for an empty body).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<UserId>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, json)
    }

    /// Start a workout as the test user and return its id.
    pub async fn start_workout(&self) -> String {
        let (status, json) = self.send("POST", "/api/v1/workouts", Some(self.user), None).await;
        assert_eq!(status, StatusCode::CREATED);
        json["id"].as_str().unwrap().to_string()
    }
}
