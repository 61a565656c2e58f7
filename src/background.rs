//! Background task registry for tracking spawned async tasks.
//!
//! Scheduled job runs are spawned through here so that shutdown can wait for
//! a sweep that is already deleting sessions.

// std::sync::Mutex is correct here: the lock is never held across .await points.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{info, warn};

// ============================================================================
// BackgroundTasks
// ============================================================================

/// Registry for background tasks that should be awaited on shutdown.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    handles: Arc<Mutex<Vec<(&'static str, JoinHandle<()>)>>>,
}

impl BackgroundTasks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a named background task and register its handle.
    ///
    /// Registration happens before this returns, so a task that finishes
    /// instantly is still observed by `shutdown()`.
    pub fn spawn<F>(&self, name: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);

        let mut guard = self.handles();
        guard.retain(|(_, h)| !h.is_finished());
        guard.push((name, handle));
    }

    /// Wait for all registered background tasks to complete.
    pub async fn shutdown(&self) {
        let handles = std::mem::take(&mut *self.handles());

        if handles.is_empty() {
            return;
        }

        info!(count = handles.len(), "Waiting for background tasks to complete");

        for (name, handle) in handles {
            if let Err(e) = handle.await {
                warn!(task = name, error = %e, "Background task panicked");
            }
        }

        info!("All background tasks completed");
    }

    /// Number of tasks still running.
    pub fn pending_count(&self) -> usize {
        let mut guard = self.handles();
        guard.retain(|(_, h)| !h.is_finished());
        guard.len()
    }

    // A panicking task never holds this lock, so poisoning carries no broken state.
    fn handles(&self) -> MutexGuard<'_, Vec<(&'static str, JoinHandle<()>)>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Tests
// ============================================================================
