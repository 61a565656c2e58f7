//! File-based session and set storage.
//!
//! Directory structure:
//! ```text
//! {sessions_dir}/
//!   {session_id}/
//!     workout.yaml       # Session and its full set list
//! ```
//!
//! A session and its sets share one document, so every write that touches
//! both commits with a single rename. Read-modify-write calls on the same
//! session must be serialized by the caller (see [`crate::sync::KeyedLocks`]).

// The id generator lock is never held across an .await.
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;
use ulid::Generator;

use crate::store::error::{StorageError, StorageResult};
use crate::store::session::SessionStore;
use crate::store::set::SetStore;
use crate::workout::{NewSet, Session, SessionId, WorkoutSet};

use super::{read_yaml, remove_if_exists, write_yaml_atomic};

const WORKOUT_FILE: &str = "workout.yaml";

#[derive(Debug, Serialize, Deserialize)]
struct WorkoutDocument {
    session: Session,
    #[serde(default)]
    sets: Vec<WorkoutSet>,
}

/// File-based implementation of [`SessionStore`] and [`SetStore`].
///
/// Set ids come from a monotonic ULID generator, so sorting by id
/// reproduces insertion order.
pub struct FileWorkoutStore {
    sessions_dir: PathBuf,
    set_ids: Mutex<Generator>,
}

impl FileWorkoutStore {
    /// Create a new file workout store.
    ///
    /// The sessions directory will be created when the first session is stored.
    pub fn new(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
            set_ids: Mutex::new(Generator::new()),
        }
    }

    fn session_dir(&self, id: SessionId) -> PathBuf {
        self.sessions_dir.join(id.to_string())
    }

    fn document_path(&self, id: SessionId) -> PathBuf {
        self.session_dir(id).join(WORKOUT_FILE)
    }

    async fn load_document(&self, id: SessionId) -> StorageResult<Option<WorkoutDocument>> {
        read_yaml(&self.document_path(id)).await
    }

    async fn require_document(&self, id: SessionId) -> StorageResult<WorkoutDocument> {
        self.load_document(id).await?.ok_or_else(|| {
            StorageError::integrity(format!("cannot store sets for unknown session {id}"))
        })
    }

    async fn write_document(&self, doc: &WorkoutDocument) -> StorageResult<()> {
        write_yaml_atomic(&self.document_path(doc.session.id), doc).await
    }

    fn allocate(&self, session_id: SessionId, sets: Vec<NewSet>) -> StorageResult<Vec<WorkoutSet>> {
        let mut generator = self
            .set_ids
            .lock()
            .map_err(|_| StorageError::IdAllocation("set id generator poisoned".to_string()))?;

        sets.into_iter()
            .map(|set| {
                generator
                    .generate()
                    .map(|id| set.into_set(id, session_id))
                    .map_err(|e| StorageError::IdAllocation(e.to_string()))
            })
            .collect()
    }
}

fn sort_for_readback(sets: &mut [WorkoutSet]) {
    sets.sort_by(|a, b| (a.exercise_order, a.id).cmp(&(b.exercise_order, b.id)));
}

#[async_trait]
impl SessionStore for FileWorkoutStore {
    async fn create(&self, session: &Session) -> StorageResult<()> {
        let path = self.document_path(session.id);
        let exists = fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::file_io(&path, e))?;
        if exists {
            return Err(StorageError::integrity(format!(
                "session {} already exists",
                session.id
            )));
        }
        self.write_document(&WorkoutDocument {
            session: session.clone(),
            sets: Vec::new(),
        })
        .await
    }

    async fn load(&self, id: SessionId) -> StorageResult<Option<Session>> {
        Ok(self.load_document(id).await?.map(|doc| doc.session))
    }

    async fn save(&self, session: &Session) -> StorageResult<()> {
        let sets = match self.load_document(session.id).await? {
            Some(doc) => doc.sets,
            None => Vec::new(),
        };
        self.write_document(&WorkoutDocument {
            session: session.clone(),
            sets,
        })
        .await
    }

    async fn delete(&self, id: SessionId) -> StorageResult<()> {
        // Removing the document is the commit; the directory is leftover.
        remove_if_exists(&self.document_path(id)).await?;

        let dir = self.session_dir(id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(session_id = %id, error = %e, "Failed to remove session directory"),
        }
        Ok(())
    }

    /// Unreadable documents are logged and skipped.
    async fn list(&self) -> StorageResult<Vec<Session>> {
        let mut sessions = Vec::new();

        let mut entries = match fs::read_dir(&self.sessions_dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::file_io(&self.sessions_dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::file_io(&self.sessions_dir, e))?
        {
            match entry.file_type().await {
                Ok(file_type) if file_type.is_dir() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unreadable session entry");
                    continue;
                }
            }

            let path = entry.path().join(WORKOUT_FILE);
            match read_yaml::<WorkoutDocument>(&path).await {
                Ok(Some(doc)) => sessions.push(doc.session),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable session document"),
            }
        }

        Ok(sessions)
    }
}

#[async_trait]
impl SetStore for FileWorkoutStore {
    async fn list_sets(&self, session_id: SessionId) -> StorageResult<Vec<WorkoutSet>> {
        let mut sets = match self.load_document(session_id).await? {
            Some(doc) => doc.sets,
            None => Vec::new(),
        };
        sort_for_readback(&mut sets);
        Ok(sets)
    }

    async fn replace_sets_and_save(
        &self,
        session: &Session,
        sets: Vec<NewSet>,
    ) -> StorageResult<Vec<WorkoutSet>> {
        self.require_document(session.id).await?;

        let mut stored = self.allocate(session.id, sets)?;
        self.write_document(&WorkoutDocument {
            session: session.clone(),
            sets: stored.clone(),
        })
        .await?;

        sort_for_readback(&mut stored);
        Ok(stored)
    }
}
