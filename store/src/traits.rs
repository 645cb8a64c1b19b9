use async_trait::async_trait;
use serde_json::Value;

use crate::{StoreError, StorePath, Subscription};

/// The capability every client shares. Writes of `None` remove the subtree.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// One-shot read; `None` when nothing lives at `path`.
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;

    /// Delivers the current value immediately, then again after every write
    /// that touches `path` or anything beneath or above it.
    async fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError>;

    /// Replaces the whole subtree at `path`.
    async fn write(&self, path: &StorePath, value: Option<Value>) -> Result<(), StoreError>;

    /// Applies every update, then notifies each subscriber once.
    async fn multi_update(&self, updates: Vec<(StorePath, Option<Value>)>)
        -> Result<(), StoreError>;

    /// Read-modify-write on an integer counter; missing counters start at zero.
    async fn atomic_increment(&self, path: &StorePath, delta: i64) -> Result<i64, StoreError>;

    /// Registers a write to perform when `client_id` disconnects.
    async fn on_leave(
        &self,
        client_id: &str,
        path: &StorePath,
        value: Option<Value>,
    ) -> Result<(), StoreError>;

    /// Drops the client's connection, firing its `on_leave` writes.
    async fn disconnect(&self, client_id: &str) -> Result<(), StoreError>;
}
