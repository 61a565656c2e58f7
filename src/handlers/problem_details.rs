//! RFC 7807 problem details responses.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Body of an `application/problem+json` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

fn problem(status: StatusCode, detail: Option<String>) -> Response {
    let body = ProblemDetails {
        problem_type: "about:blank".to_string(),
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        status: status.as_u16(),
        detail,
    };
    (
        status,
        [(header::CONTENT_TYPE, "application/problem+json")],
        Json(body),
    )
        .into_response()
}

pub fn bad_request(detail: impl Into<String>) -> Response {
    problem(StatusCode::BAD_REQUEST, Some(detail.into()))
}

pub fn unauthorized(detail: impl Into<String>) -> Response {
    problem(StatusCode::UNAUTHORIZED, Some(detail.into()))
}

pub fn not_found(detail: impl Into<String>) -> Response {
    problem(StatusCode::NOT_FOUND, Some(detail.into()))
}

pub fn service_unavailable(detail: impl Into<String>) -> Response {
    problem(StatusCode::SERVICE_UNAVAILABLE, Some(detail.into()))
}

pub fn internal_error(detail: impl Into<String>) -> Response {
    problem(StatusCode::INTERNAL_SERVER_ERROR, Some(detail.into()))
}
