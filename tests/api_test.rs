//! Integration tests for the HTTP API.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

mod common;

use common::{test_app, test_app_with};

// ============================================================================
// Health Endpoints
// ============================================================================

#[tokio::test]
async fn test_livez() {
    let app = test_app().await;
    let (status, body) = app.send("GET", "/livez", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn test_readyz() {
    let app = test_app().await;
    let (status, body) = app.send("GET", "/readyz", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["scheduler"], false);
}

#[tokio::test]
async fn test_version() {
    let app = test_app().await;
    let (status, body) = app.send("GET", "/version", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("version").is_some());
}

// ============================================================================
// Auth & Identity
// ============================================================================

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let app = test_app().await;
    let (status, body) = app.send("GET", "/api/v1/workouts", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn remote_caller_without_token_config_is_rejected() {
    let app = test_app_with(None, "10.1.2.3:5000").await;
    let (status, _) = app.send("GET", "/api/v1/workouts", Some(app.user), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Workout Lifecycle
// ============================================================================

#[tokio::test]
async fn start_then_history_and_details() {
    let app = test_app().await;
    let id = app.start_workout().await;

    let (status, body) = app.send("GET", "/api/v1/workouts", Some(app.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["workouts"].as_array().unwrap().len(), 1);
    assert_eq!(body["workouts"][0]["id"], id.as_str());
    assert_eq!(body["workouts"][0]["status"], "IN_PROGRESS");

    let (status, body) = app
        .send("GET", &format!("/api/v1/workouts/{id}"), Some(app.user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocks"], json!([]));
}

#[tokio::test]
async fn foreign_session_reads_as_not_found() {
    let app = test_app().await;
    let id = app.start_workout().await;
    let stranger = Some(Uuid::new_v4());

    let (status, _) = app
        .send("GET", &format!("/api/v1/workouts/{id}"), stranger, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("DELETE", &format!("/api/v1/workouts/{id}"), stranger, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_session_id_is_not_found() {
    let app = test_app().await;
    let (status, _) = app
        .send("GET", "/api/v1/workouts/not-a-uuid", Some(app.user), None)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn finish_with_sets_replaces_and_groups_blocks() {
    let app = test_app().await;
    let id = app.start_workout().await;

    let payload = json!({
        "exercises": [
            {
                "exercise_id": app.squat.id,
                "sets": [
                    {"reps": 5, "weight": 100, "set_number": 1},
                    {"reps": 5, "weight": "102.5", "set_number": 2},
                    {"reps": 0, "weight": 100}
                ]
            },
            {
                "exercise_id": app.cable_fly.id,
                "sets": [{"reps": 12, "weight": 15}]
            }
        ]
    });
    let (status, _) = app
        .send(
            "POST",
            &format!("/api/v1/workouts/{id}/finish"),
            Some(app.user),
            Some(payload),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .send("GET", &format!("/api/v1/workouts/{id}"), Some(app.user), None)
        .await;
    assert_eq!(body["status"], "FINISHED");
    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["exercise"]["name"], "Squat");
    assert_eq!(blocks[0]["sets"].as_array().unwrap().len(), 2);
    assert_eq!(blocks[1]["exercise"]["name"], "Cable Fly");

    let pushed = app.analytics.pushed_workouts();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].sets.len(), 3);
}

#[tokio::test]
async fn finish_with_foreign_exercise_is_rejected_and_keeps_session_open() {
    let app = test_app().await;
    let id = app.start_workout().await;

    let payload = json!({
        "exercises": [{"exercise_id": app.foreign.id, "sets": [{"reps": 5, "weight": 10}]}]
    });
    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/workouts/{id}/finish"),
            Some(app.user),
            Some(payload),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Exercise not accessible");

    let (_, body) = app
        .send("GET", &format!("/api/v1/workouts/{id}"), Some(app.user), None)
        .await;
    assert_eq!(body["status"], "IN_PROGRESS");
    assert!(app.analytics.pushed_workouts().is_empty());
}

#[tokio::test]
async fn finish_with_unknown_exercise_names_it() {
    let app = test_app().await;
    let id = app.start_workout().await;
    let missing = Uuid::new_v4();

    let payload = json!({
        "exercises": [{"exercise_id": missing, "sets": [{"reps": 5, "weight": 10}]}]
    });
    let (status, body) = app
        .send(
            "POST",
            &format!("/api/v1/workouts/{id}/finish"),
            Some(app.user),
            Some(payload),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], format!("Exercise not found: {missing}"));
}

#[tokio::test]
async fn empty_finish_body_falls_back_and_second_finish_still_succeeds() {
    let app = test_app().await;
    let id = app.start_workout().await;
    let uri = format!("/api/v1/workouts/{id}/finish");

    let (status, _) = app.send("POST", &uri, Some(app.user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, first) = app
        .send("GET", &format!("/api/v1/workouts/{id}"), Some(app.user), None)
        .await;

    // finishing again keeps the first timestamp
    let (status, _) = app
        .send("POST", &uri, Some(app.user), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, second) = app
        .send("GET", &format!("/api/v1/workouts/{id}"), Some(app.user), None)
        .await;
    assert_eq!(first["finished_at"], second["finished_at"]);
}

#[tokio::test]
async fn malformed_finish_body_is_bad_request() {
    let app = test_app().await;
    let id = app.start_workout().await;

    let (status, _) = app
        .send(
            "POST",
            &format!("/api/v1/workouts/{id}/finish"),
            Some(app.user),
            Some(json!({"exercises": "squats"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_session_and_notifies_analytics() {
    let app = test_app().await;
    let id = app.start_workout().await;

    let (status, _) = app
        .send("DELETE", &format!("/api/v1/workouts/{id}"), Some(app.user), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send("GET", &format!("/api/v1/workouts/{id}"), Some(app.user), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let deleted = app.analytics.deleted_workouts();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].to_string(), id);
}

// ============================================================================
// Exercises
// ============================================================================

#[tokio::test]
async fn available_exercises_are_own_and_system_sorted_by_name() {
    let app = test_app().await;
    let (status, body) = app.send("GET", "/api/v1/exercises", Some(app.user), None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cable Fly", "Squat"]);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn run_job_without_scheduler_is_unavailable() {
    let app = test_app().await;
    let (status, _) = app
        .send("POST", "/api/admin/v1/jobs/reap-abandoned-workouts/run", None, None)
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn admin_from_remote_without_token_is_forbidden() {
    let app = test_app_with(None, "10.1.2.3:5000").await;
    let (status, _) = app
        .send("POST", "/api/admin/v1/shutdown", None, None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn shutdown_twice_conflicts() {
    let app = test_app().await;

    let (status, _) = app.send("POST", "/api/admin/v1/shutdown", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send("POST", "/api/admin/v1/shutdown", None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn resync_exercise_pushes_present_and_deletes_absent() {
    let app = test_app().await;

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/admin/v1/exercises/{}/sync", app.squat.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");
    assert_eq!(app.analytics.pushed_exercises(), vec![app.squat.id]);

    let gone = Uuid::new_v4();
    let (status, body) = app
        .send("POST", &format!("/api/admin/v1/exercises/{gone}/sync"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");
    assert_eq!(app.analytics.deleted_exercises(), vec![gone]);
}
