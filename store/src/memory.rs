use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{SharedStore, StoreError, StorePath, Subscription};

/// A process-local store with the same observable semantics the clients rely on:
/// whole-subtree writes, one notification per multi-path update, and
/// disconnect hooks.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    root: Value,
    subscribers: Vec<Subscriber>,
    leave_hooks: HashMap<String, Vec<(StorePath, Option<Value>)>>,
}

#[derive(Debug)]
struct Subscriber {
    path: StorePath,
    sender: UnboundedSender<Option<Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a panicking writer leaves the tree consistent: every write is a single assignment
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl Inner {
    fn apply(&mut self, updates: Vec<(StorePath, Option<Value>)>) {
        let changed: Vec<StorePath> = updates.iter().map(|(path, _)| path.clone()).collect();
        for (path, value) in updates {
            let value = value.filter(|v| !v.is_null());
            tracing::trace!("write {} = {:?}", path, value);
            set_at(&mut self.root, path.segments(), value);
        }
        self.notify(&changed);
    }

    fn notify(&mut self, changed: &[StorePath]) {
        let Inner {
            root, subscribers, ..
        } = self;
        subscribers.retain(|sub| {
            if !changed.iter().any(|path| path.overlaps(&sub.path)) {
                return !sub.sender.is_closed();
            }
            sub.sender.send(snapshot(root, &sub.path)).is_ok()
        });
    }
}

fn lookup<'a>(node: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments.iter().try_fold(node, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// Empty objects and nulls read as "nothing here".
fn snapshot(root: &Value, path: &StorePath) -> Option<Value> {
    lookup(root, path.segments())
        .filter(|value| !is_empty(value))
        .cloned()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn set_at(node: &mut Value, segments: &[String], value: Option<Value>) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value.unwrap_or_else(|| Value::Object(Map::new()));
        return;
    };

    match value {
        Some(value) if rest.is_empty() => {
            ensure_object(node).insert(head.clone(), value);
        }
        Some(value) => {
            let child = ensure_object(node)
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            set_at(child, rest, Some(value));
        }
        None => {
            let Some(map) = node.as_object_mut() else {
                return;
            };
            if rest.is_empty() {
                map.remove(head);
                return;
            }
            let Some(child) = map.get_mut(head) else {
                return;
            };
            set_at(child, rest, None);
            // prune parents left empty by the removal
            if is_empty(child) {
                map.remove(head);
            }
        }
    }
}

#[async_trait]
impl SharedStore for InMemoryStore {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        Ok(snapshot(&self.lock().root, path))
    }

    async fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        sender
            .send(snapshot(&inner.root, path))
            .map_err(|_| StoreError::Disconnected)?;
        inner.subscribers.push(Subscriber {
            path: path.clone(),
            sender,
        });
        tracing::debug!("subscribed to {}", path);
        Ok(Subscription::new(receiver))
    }

    async fn write(&self, path: &StorePath, value: Option<Value>) -> Result<(), StoreError> {
        self.lock().apply(vec![(path.clone(), value)]);
        Ok(())
    }

    async fn multi_update(
        &self,
        updates: Vec<(StorePath, Option<Value>)>,
    ) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        self.lock().apply(updates);
        Ok(())
    }

    async fn atomic_increment(&self, path: &StorePath, delta: i64) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        let current = match snapshot(&inner.root, path) {
            None => 0,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| StoreError::NotANumber(path.to_string()))?,
        };
        let next = current + delta;
        inner.apply(vec![(path.clone(), Some(Value::from(next)))]);
        Ok(next)
    }

    async fn on_leave(
        &self,
        client_id: &str,
        path: &StorePath,
        value: Option<Value>,
    ) -> Result<(), StoreError> {
        self.lock()
            .leave_hooks
            .entry(client_id.to_string())
            .or_default()
            .push((path.clone(), value));
        Ok(())
    }

    async fn disconnect(&self, client_id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let hooks = inner.leave_hooks.remove(client_id).unwrap_or_default();
        tracing::info!(
            "client {} disconnected, running {} leave hook(s)",
            client_id,
            hooks.len()
        );
        if !hooks.is_empty() {
            inner.apply(hooks);
        }
        Ok(())
    }
}
