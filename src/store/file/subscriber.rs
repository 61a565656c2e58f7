//! File-backed subscriber store (`subscribers.yaml`).

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::store::error::StorageResult;
use crate::store::subscriber::SubscriberStore;
use crate::subscription::Subscriber;

use super::{read_yaml, write_yaml_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SubscribersDocument {
    #[serde(default)]
    subscribers: Vec<Subscriber>,
}

/// File-based implementation of [`SubscriberStore`].
///
/// Saves are read-modify-write on a single document and are serialized
/// through a lock.
#[derive(Debug)]
pub struct FileSubscriberStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSubscriberStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load_document(&self) -> StorageResult<SubscribersDocument> {
        Ok(read_yaml(&self.path).await?.unwrap_or_default())
    }
}

#[async_trait]
impl SubscriberStore for FileSubscriberStore {
    async fn list(&self) -> StorageResult<Vec<Subscriber>> {
        Ok(self.load_document().await?.subscribers)
    }

    async fn save(&self, subscriber: &Subscriber) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load_document().await?;
        match doc
            .subscribers
            .iter_mut()
            .find(|s| s.user_id == subscriber.user_id)
        {
            Some(existing) => *existing = subscriber.clone(),
            None => doc.subscribers.push(subscriber.clone()),
        }

        write_yaml_atomic(&self.path, &doc).await
    }
}
