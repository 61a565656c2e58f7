//! Per-key async locks.
//!
//! Lifecycle operations, the reaper and scheduled jobs take a lock keyed by
//! the entity they mutate, so one process never runs two units of work on the
//! same session at the same time.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Default interval between cleanup runs (1 hour).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Default max idle age before a lock is considered stale (2 hours).
pub const DEFAULT_MAX_IDLE_AGE: Duration = Duration::from_secs(7200);

/// Maps key to (lock, last_access_time).
type LockStorage<K> = DashMap<K, (Arc<Mutex<()>>, Instant)>;

/// Per-key async mutex with stale entry cleanup.
///
/// Different keys lock independently; the same key serializes.
///
/// ```ignore
/// let locks = KeyedLocks::new();
/// let lock = locks.get(session_id);
/// let _guard = lock.lock().await;
/// ```
#[derive(Clone)]
pub struct KeyedLocks<K = Uuid>
where
    K: Eq + Hash,
{
    locks: Arc<LockStorage<K>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Create a lock collection and spawn its periodic cleanup task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_cleanup(name: &'static str) -> Self {
        let locks = Self::new();
        locks.clone().spawn_cleanup_task(name);
        locks
    }

    /// Get or create the lock for `key`, refreshing its last-access time.
    pub fn get(&self, key: K) -> Arc<Mutex<()>> {
        let now = Instant::now();
        self.locks
            .entry(key)
            .and_modify(|(_, last_access)| *last_access = now)
            .or_insert_with(|| (Arc::new(Mutex::new(())), now))
            .0
            .clone()
    }

    /// Remove entries idle for longer than `max_age` that nobody references.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_stale(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let before = self.locks.len();
        // strong_count == 1: only the map holds the lock, nobody waits on it
        self.locks.retain(|_, (lock, last_access)| {
            Arc::strong_count(lock) > 1 || now.duration_since(*last_access) <= max_age
        });
        before.saturating_sub(self.locks.len())
    }

    fn spawn_cleanup_task(self, name: &'static str) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(DEFAULT_CLEANUP_INTERVAL);
            loop {
                ticker.tick().await;
                let removed = self.cleanup_stale(DEFAULT_MAX_IDLE_AGE);
                if removed > 0 {
                    debug!(
                        removed,
                        remaining = self.len(),
                        locks = name,
                        "Cleaned up stale locks"
                    );
                }
            }
        });
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_returns_same_lock() {
        let locks: KeyedLocks = KeyedLocks::new();
        let id = Uuid::new_v4();

        assert!(Arc::ptr_eq(&locks.get(id), &locks.get(id)));
        assert!(!Arc::ptr_eq(&locks.get(id), &locks.get(Uuid::new_v4())));
    }

    #[test]
    fn cleanup_removes_only_idle_unreferenced_entries() {
        let locks: KeyedLocks<&'static str> = KeyedLocks::new();
        let old = Instant::now() - Duration::from_secs(10);

        locks
            .locks
            .insert("stale", (Arc::new(Mutex::new(())), old));
        let held = Arc::new(Mutex::new(()));
        locks.locks.insert("held", (Arc::clone(&held), old));
        locks.get("fresh");

        let removed = locks.cleanup_stale(Duration::from_secs(5));

        assert_eq!(removed, 1);
        assert!(locks.locks.contains_key("held"));
        assert!(locks.locks.contains_key("fresh"));
        assert!(!locks.locks.contains_key("stale"));
    }

    #[tokio::test]
    async fn same_key_serializes() {
        let locks: KeyedLocks = KeyedLocks::new();
        let id = Uuid::new_v4();

        let first = locks.get(id);
        let _guard = first.try_lock().unwrap();

        assert!(locks.get(id).try_lock().is_err());
        assert!(locks.get(Uuid::new_v4()).try_lock().is_ok());
    }
}
