//! In-process JSON tree store.
//!
//! Used for development and tests. Every write takes the tree's write lock,
//! so multi-path updates and transactions are atomic with respect to
//! readers. Like the hosted database, the tree never holds `null` or empty
//! objects: writing either deletes the location, and parents left empty are
//! pruned.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use famileey_core::result::AppResult;
use famileey_core::traits::store::{KeyValueStore, TransactionFn, TransactionResult};
use famileey_core::types::ordering::sort_by_child;
use famileey_core::types::path;
use famileey_core::types::update::MultiPathUpdate;

/// In-memory hierarchical store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    root: RwLock<Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `tree`.
    pub fn with_tree(tree: Value) -> Self {
        Self {
            root: RwLock::new(prune(tree)),
        }
    }

    /// Snapshot of the whole tree.
    pub async fn dump(&self) -> Value {
        self.root.read().await.clone()
    }
}

/// Drop nulls and empty objects recursively.
fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, prune(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if pruned.is_empty() {
                Value::Null
            } else {
                Value::Object(pruned)
            }
        }
        Value::Array(items) => {
            let pruned: Vec<Value> = items.into_iter().map(prune).collect();
            if pruned.iter().all(Value::is_null) {
                Value::Null
            } else {
                Value::Array(pruned)
            }
        }
        other => other,
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in path::segments(path) {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() { None } else { Some(node) }
}

fn write_at(node: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Some(map) = node.as_object_mut() else {
        return;
    };

    if rest.is_empty() {
        if value.is_null() {
            map.remove(*first);
        } else {
            map.insert((*first).to_string(), value);
        }
        return;
    }

    let child = map.entry((*first).to_string()).or_insert(Value::Null);
    write_at(child, rest, value);
    if child.is_null() || child.as_object().is_some_and(Map::is_empty) {
        map.remove(*first);
    }
}

fn write(root: &mut Value, normalized: &str, value: Value) {
    let segments: Vec<&str> = path::segments(normalized).collect();
    write_at(root, &segments, prune(value));
    if root.as_object().is_some_and(Map::is_empty) {
        *root = Value::Null;
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, path: &str) -> AppResult<Option<Value>> {
        let normalized = path::normalize(path)?;
        let root = self.root.read().await;
        Ok(lookup(&root, &normalized).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> AppResult<()> {
        let normalized = path::normalize(path)?;
        let mut root = self.root.write().await;
        write(&mut root, &normalized, value);
        Ok(())
    }

    async fn update(&self, update: MultiPathUpdate) -> AppResult<()> {
        let entries = update.validate()?;
        debug!(paths = entries.len(), "Applying multi-path update");
        let mut root = self.root.write().await;
        for (location, value) in entries {
            write(&mut root, &location, value);
        }
        Ok(())
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        self.set(path, Value::Null).await
    }

    async fn get_ordered(&self, path: &str, child: &str) -> AppResult<Vec<(String, Value)>> {
        let normalized = path::normalize(path)?;
        let root = self.root.read().await;
        let mut children: Vec<(String, Value)> = match lookup(&root, &normalized) {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Vec::new(),
        };
        sort_by_child(&mut children, child);
        Ok(children)
    }

    async fn transaction(&self, path: &str, apply: &TransactionFn) -> AppResult<TransactionResult> {
        let normalized = path::normalize(path)?;
        let mut root = self.root.write().await;
        let current = lookup(&root, &normalized).cloned();
        match apply(current.clone()) {
            None => Ok(TransactionResult {
                committed: false,
                snapshot: current,
            }),
            Some(next) => {
                write(&mut root, &normalized, next);
                Ok(TransactionResult {
                    committed: true,
                    snapshot: lookup(&root, &normalized).cloned(),
                })
            }
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
