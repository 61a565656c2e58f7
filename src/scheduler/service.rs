//! Scheduler service for running maintenance jobs.
//!
//! Runs as a background task. Each registered job gets a timer task that
//! sleeps until the job's next firing; job runs are spawned through
//! [`BackgroundTasks`] so shutdown can wait for them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::background::BackgroundTasks;

use super::cadence::Cadence;
use super::error::{Result, SchedulerError};

/// A unit of maintenance work run on a [`Cadence`].
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Stable name used in logs and for run-now triggers.
    fn name(&self) -> &'static str;

    /// Run once. Returns a short summary for the log.
    async fn run(&self, now: DateTime<Utc>) -> Result<String>;
}

// ============================================================================
// Public API
// ============================================================================

/// Handle for interacting with the scheduler service.
#[derive(Clone)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    /// Run a job now, outside its cadence.
    ///
    /// Returns once the run is dispatched, not when it completes. A run is
    /// skipped if the same job is still running.
    pub async fn trigger(&self, name: &str) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(SchedulerCommand::RunNow {
                name: name.to_string(),
                reply,
            })
            .await
            .map_err(|_| SchedulerError::ShutDown)?;
        rx.await.map_err(|_| SchedulerError::ShutDown)?
    }

    /// Stop all timers and wait for in-flight runs to finish.
    pub async fn shutdown(&self) {
        let (done, rx) = oneshot::channel();
        if self
            .command_tx
            .send(SchedulerCommand::Shutdown { done })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }
}

/// The scheduler service.
pub struct SchedulerService {
    jobs: HashMap<&'static str, RegisteredJob>,
    tasks: BackgroundTasks,
    cancel: CancellationToken,
}

impl SchedulerService {
    pub fn new(tasks: BackgroundTasks) -> Self {
        Self {
            jobs: HashMap::new(),
            tasks,
            cancel: CancellationToken::new(),
        }
    }

    /// Register a job. A later registration under the same name replaces it.
    pub fn register(&mut self, job: Arc<dyn ScheduledJob>, cadence: Cadence) {
        self.insert(job, cadence, false);
    }

    /// Register a job that also runs once when the scheduler starts, then
    /// follows its cadence.
    pub fn register_with_initial_run(&mut self, job: Arc<dyn ScheduledJob>, cadence: Cadence) {
        self.insert(job, cadence, true);
    }

    fn insert(&mut self, job: Arc<dyn ScheduledJob>, cadence: Cadence, initial_run: bool) {
        let name = job.name();
        self.jobs.insert(
            name,
            RegisteredJob {
                job,
                cadence,
                initial_run,
                running: Arc::new(Mutex::new(())),
            },
        );
    }

    /// Start timers for every registered job and spawn the command loop.
    pub fn start(self) -> SchedulerHandle {
        let (command_tx, command_rx) = mpsc::channel(16);

        for registered in self.jobs.values() {
            if registered.initial_run {
                dispatch(&self.tasks, registered.clone(), "startup");
            }
            self.start_timer(registered.clone());
        }

        tokio::spawn(self.run(command_rx));

        SchedulerHandle { command_tx }
    }

    /// Main service loop.
    async fn run(self, mut command_rx: mpsc::Receiver<SchedulerCommand>) {
        info!(jobs = self.jobs.len(), "Scheduler service started");

        while let Some(cmd) = command_rx.recv().await {
            match cmd {
                SchedulerCommand::RunNow { name, reply } => {
                    let result = match self.jobs.get(name.as_str()) {
                        Some(registered) => {
                            dispatch(&self.tasks, registered.clone(), "manual");
                            Ok(())
                        }
                        None => Err(SchedulerError::NotFound(name)),
                    };
                    let _ = reply.send(result);
                }
                SchedulerCommand::Shutdown { done } => {
                    info!("Scheduler service shutting down");
                    self.cancel.cancel();
                    self.tasks.shutdown().await;
                    let _ = done.send(());
                    break;
                }
            }
        }

        info!("Scheduler service stopped");
    }

    fn start_timer(&self, registered: RegisteredJob) {
        let cancel = self.cancel.clone();
        let tasks = self.tasks.clone();

        tokio::spawn(async move {
            let name = registered.job.name();
            loop {
                let now = Utc::now();
                let Some(next_run) = registered.cadence.next_after(now) else {
                    warn!(job = name, "Could not calculate next run time");
                    return;
                };
                let delay = (next_run - now).to_std().unwrap_or(Duration::ZERO);
                debug!(job = name, next_run = %next_run, delay_secs = delay.as_secs(), "Starting timer");

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        dispatch(&tasks, registered.clone(), "schedule");
                    }
                    _ = cancel.cancelled() => {
                        debug!(job = name, "Timer cancelled");
                        return;
                    }
                }
            }
        });
    }
}

// ============================================================================
// Internal Types
// ============================================================================

enum SchedulerCommand {
    RunNow {
        name: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

#[derive(Clone)]
struct RegisteredJob {
    job: Arc<dyn ScheduledJob>,
    cadence: Cadence,
    initial_run: bool,
    /// Held for the duration of a run; prevents overlapping runs.
    running: Arc<Mutex<()>>,
}

fn dispatch(tasks: &BackgroundTasks, registered: RegisteredJob, trigger: &'static str) {
    let name = registered.job.name();
    tasks.spawn(name, async move {
        let Ok(_running) = registered.running.clone().try_lock_owned() else {
            warn!(job = name, trigger, "Job still running, skipping this run");
            return;
        };

        let started = std::time::Instant::now();
        match registered.job.run(Utc::now()).await {
            Ok(summary) => info!(
                job = name,
                trigger,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Scheduled job completed: {summary}"
            ),
            Err(e) => error!(job = name, trigger, error = %e, "Scheduled job failed"),
        }
    });
}
