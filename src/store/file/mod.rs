//! File-based storage implementations.
//!
//! Every document is YAML. All writes go through a temp file followed by a
//! rename, so a reader never observes a half-written document.

mod exercise;
mod subscriber;
mod workout;

pub use exercise::FileExerciseCatalog;
pub use subscriber::FileSubscriberStore;
pub use workout::FileWorkoutStore;

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

use super::error::{StorageError, StorageResult};

/// Read and parse a YAML document. Returns `Ok(None)` if the file is missing.
async fn read_yaml<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let contents = match fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::file_io(path, e)),
    };

    serde_saphyr::from_str(&contents)
        .map(Some)
        .map_err(|e| StorageError::file_deserialization(path, e.to_string()))
}

/// Serialize `value` to YAML and atomically replace `path` with it.
async fn write_yaml_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let yaml =
        serde_saphyr::to_string(value).map_err(|e| StorageError::serialization(e.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::file_io(parent, e))?;
    }

    let temp_path = path.with_extension("yaml.tmp");
    fs::write(&temp_path, yaml.as_bytes())
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    fs::rename(&temp_path, path)
        .await
        .map_err(|e| StorageError::file_io(path, e))?;

    Ok(())
}

/// Remove a file, treating a missing file as success.
async fn remove_if_exists(path: &Path) -> StorageResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::file_io(path, e)),
    }
}
