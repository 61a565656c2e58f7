//! CLI command implementations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use ironlog::analytics::{AnalyticsClient, AnalyticsSync, HttpAnalyticsClient, NoopAnalyticsClient};
use ironlog::config::Config;
use ironlog::exercise::ExerciseAccess;
use ironlog::store::file::{FileExerciseCatalog, FileSubscriberStore, FileWorkoutStore};
use ironlog::subscription::RenewalService;
use ironlog::sync::KeyedLocks;
use ironlog::workout::{AbandonedSessionReaper, WorkoutService};

pub mod maintenance;
pub mod serve;

/// Services wired from a loaded config, shared by every command.
pub struct Runtime {
    pub config: Config,
    pub workouts: WorkoutService,
    pub reaper: AbandonedSessionReaper,
    pub renewals: RenewalService,
}

impl Runtime {
    /// Load `config_path` and build the stores and services under its data
    /// directory.
    pub async fn load(config_path: &str) -> Result<Self> {
        let config = Config::load(config_path)
            .await
            .with_context(|| format!("failed to load config '{config_path}'"))?;
        Self::build(config, Path::new(config_path))
    }

    pub fn build(config: Config, config_path: &Path) -> Result<Self> {
        let data_dir = config.data_dir(config_path);
        info!(data_dir = %data_dir.display(), "Using data directory");

        let workout_store = Arc::new(FileWorkoutStore::new(data_dir.join("sessions")));
        let catalog = Arc::new(FileExerciseCatalog::new(data_dir.join("exercises.yaml")));
        let subscribers = Arc::new(FileSubscriberStore::new(data_dir.join("subscribers.yaml")));

        let client: Arc<dyn AnalyticsClient> = if config.analytics.enabled {
            info!(base_url = %config.analytics.base_url, "Analytics sync enabled");
            Arc::new(
                HttpAnalyticsClient::new(
                    &config.analytics.base_url,
                    Duration::from_secs(config.analytics.timeout_seconds),
                )
                .context("failed to build analytics client")?,
            )
        } else {
            info!("Analytics sync disabled");
            Arc::new(NoopAnalyticsClient)
        };

        let locks = KeyedLocks::with_cleanup("session_locks");

        let workouts = WorkoutService::new(
            workout_store.clone(),
            workout_store.clone(),
            catalog,
            AnalyticsSync::new(client),
            ExerciseAccess::new(config.exercises.system_owner),
            locks.clone(),
        );
        let reaper = AbandonedSessionReaper::new(
            workout_store,
            locks,
            chrono::Duration::days(config.scheduler.abandon_after_days),
        );
        let renewals = RenewalService::new(
            subscribers,
            chrono::Duration::days(config.scheduler.renewal_period_days),
        );

        Ok(Self {
            config,
            workouts,
            reaper,
            renewals,
        })
    }
}
