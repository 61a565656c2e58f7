//! Subscriber storage trait.

use async_trait::async_trait;

use crate::subscription::Subscriber;

use super::error::StorageResult;

/// Storage interface for subscription state.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// List every subscriber.
    async fn list(&self) -> StorageResult<Vec<Subscriber>>;

    /// Create or update a subscriber, keyed by user id.
    async fn save(&self, subscriber: &Subscriber) -> StorageResult<()>;
}
