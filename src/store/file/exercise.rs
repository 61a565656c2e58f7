//! File-backed exercise catalog.
//!
//! Reads `exercises.yaml`:
//! ```yaml
//! exercises:
//!   - id: 6f1c2a1e-3b7a-4f1e-9d1e-2b3c4d5e6f70
//!     owner_id: 00000000-0000-0000-0000-000000000001
//!     name: Back Squat
//!     attributes:
//!       primary_muscle: LEGS
//!       equipment: BARBELL
//! ```
//! The file is re-read on every lookup so edits made by the catalog owner
//! are picked up without a restart.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::exercise::{Exercise, ExerciseId, UserId};
use crate::store::error::StorageResult;
use crate::store::exercise::ExerciseCatalog;

use super::{read_yaml, write_yaml_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    exercises: Vec<Exercise>,
}

/// File-based implementation of [`ExerciseCatalog`].
#[derive(Debug, Clone)]
pub struct FileExerciseCatalog {
    path: PathBuf,
}

impl FileExerciseCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load_all(&self) -> StorageResult<Vec<Exercise>> {
        let doc: CatalogDocument = read_yaml(&self.path).await?.unwrap_or_default();
        Ok(doc.exercises)
    }

    /// Replace the catalog contents. Used for seeding.
    pub async fn write_all(&self, exercises: Vec<Exercise>) -> StorageResult<()> {
        write_yaml_atomic(&self.path, &CatalogDocument { exercises }).await
    }
}

#[async_trait]
impl ExerciseCatalog for FileExerciseCatalog {
    async fn find_by_id(&self, id: ExerciseId) -> StorageResult<Option<Exercise>> {
        Ok(self.load_all().await?.into_iter().find(|e| e.id == id))
    }

    async fn find_many(&self, ids: &[ExerciseId]) -> StorageResult<HashMap<ExerciseId, Exercise>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| (e.id, e))
            .collect())
    }

    async fn list_owned_by(&self, owners: &[UserId]) -> StorageResult<Vec<Exercise>> {
        let mut exercises: Vec<Exercise> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|e| owners.contains(&e.owner_id))
            .collect();
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{ExerciseAttributes, SYSTEM_OWNER_ID};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn exercise(owner: UserId, name: &str) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: name.to_string(),
            attributes: ExerciseAttributes::default(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty_catalog() {
        let temp = TempDir::new().unwrap();
        let catalog = FileExerciseCatalog::new(temp.path().join("exercises.yaml"));

        assert!(catalog.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert!(catalog.list_owned_by(&[SYSTEM_OWNER_ID]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_by_id_and_many() {
        let temp = TempDir::new().unwrap();
        let catalog = FileExerciseCatalog::new(temp.path().join("exercises.yaml"));
        let squat = exercise(SYSTEM_OWNER_ID, "Squat");
        let curl = exercise(Uuid::new_v4(), "Curl");
        catalog
            .write_all(vec![squat.clone(), curl.clone()])
            .await
            .unwrap();

        assert_eq!(catalog.find_by_id(squat.id).await.unwrap(), Some(squat.clone()));

        let found = catalog
            .find_many(&[squat.id, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&squat.id));
    }

    #[tokio::test]
    async fn list_owned_by_filters_and_sorts_by_name() {
        let temp = TempDir::new().unwrap();
        let catalog = FileExerciseCatalog::new(temp.path().join("exercises.yaml"));
        let user = Uuid::new_v4();
        catalog
            .write_all(vec![
                exercise(SYSTEM_OWNER_ID, "Squat"),
                exercise(user, "Cable Fly"),
                exercise(Uuid::new_v4(), "Hidden"),
                exercise(SYSTEM_OWNER_ID, "Bench Press"),
            ])
            .await
            .unwrap();

        let names: Vec<_> = catalog
            .list_owned_by(&[SYSTEM_OWNER_ID, user])
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Bench Press", "Cable Fly", "Squat"]);
    }
}
