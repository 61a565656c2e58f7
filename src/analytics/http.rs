//! reqwest-backed analytics client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::exercise::ExerciseId;
use crate::workout::SessionId;

use super::client::AnalyticsClient;
use super::error::{AnalyticsError, Result};
use super::types::{ExerciseSyncRequest, WorkoutSyncRequest};

/// HTTP client for the analytics replica's internal sync endpoints.
#[derive(Debug, Clone)]
pub struct HttpAnalyticsClient {
    base_url: String,
    http: Client,
}

impl HttpAnalyticsClient {
    /// Create a client for `base_url`, e.g. `http://localhost:1010/api/analytics`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AnalyticsError::NotFound);
        }

        let message = match response.text().await {
            Ok(body) if !body.is_empty() => body,
            _ => format!("HTTP {}", status.as_u16()),
        };
        Err(AnalyticsError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AnalyticsClient for HttpAnalyticsClient {
    async fn push_exercises(&self, exercises: &[ExerciseSyncRequest]) -> Result<()> {
        let response = self
            .http
            .post(self.url("/internal/exercises"))
            .json(exercises)
            .send()
            .await?;
        self.check(response).await
    }

    async fn delete_exercise(&self, id: ExerciseId) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/internal/exercises/{id}")))
            .send()
            .await?;
        self.check(response).await
    }

    async fn push_workout(&self, workout: &WorkoutSyncRequest) -> Result<()> {
        let response = self
            .http
            .post(self.url("/internal/workouts"))
            .json(workout)
            .send()
            .await?;
        self.check(response).await
    }

    async fn delete_workout(&self, id: SessionId) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/internal/workouts/{id}")))
            .send()
            .await?;
        self.check(response).await
    }
}
