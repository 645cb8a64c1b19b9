use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::StoreError;

/// Stream of snapshots for one path. `None` snapshots mean the path is empty.
#[derive(Debug)]
pub struct Subscription {
    receiver: UnboundedReceiver<Option<Value>>,
}

impl Subscription {
    pub fn new(receiver: UnboundedReceiver<Option<Value>>) -> Self {
        Self { receiver }
    }

    /// Waits for the next snapshot. Errors once the store has gone away.
    pub async fn next(&mut self) -> Result<Option<Value>, StoreError> {
        self.receiver.recv().await.ok_or(StoreError::Disconnected)
    }

    /// Skips ahead to the newest snapshot already queued, waiting only if none
    /// is. A queued `None` is never skipped: it is returned as soon as it is
    /// reached, even when later snapshots follow it.
    pub async fn latest(&mut self) -> Result<Option<Value>, StoreError> {
        let mut snapshot = self.next().await?;
        while snapshot.is_some() {
            match self.receiver.try_recv() {
                Ok(newer) => snapshot = newer,
                Err(_) => break,
            }
        }
        Ok(snapshot)
    }
}
