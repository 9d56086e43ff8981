//! Key/value storage backend abstraction.
//!
//! The broker core never touches a persistence primitive directly; all
//! state goes through [`StorageBackend`], which mirrors the host's two
//! storage areas: a synchronized one for settings and a device-local one
//! for cached analyses, trust lists, and tokens.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

/// Which storage area a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreArea {
    /// Synchronized across the user's devices. Holds settings.
    Sync,
    /// Device-local. Holds cached analyses, trust lists, and tokens.
    Local,
}

impl StoreArea {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreArea::Sync => "sync",
            StoreArea::Local => "local",
        }
    }
}

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    TaskFailed(String),

    #[error("stored value has unexpected shape: {0}")]
    InvalidShape(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Asynchronous key/value storage over JSON values.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    async fn get(&self, area: StoreArea, key: &str) -> StorageResult<Option<Value>>;

    async fn set(&self, area: StoreArea, key: &str, value: Value) -> StorageResult<()>;

    async fn remove(&self, area: StoreArea, key: &str) -> StorageResult<()>;

    /// A point-in-time copy of every key/value pair in an area.
    async fn snapshot(&self, area: StoreArea) -> StorageResult<HashMap<String, Value>>;
}

/// In-memory backend used in tests and by hosts that bridge persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    areas: RwLock<HashMap<StoreArea, HashMap<String, Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, area: StoreArea, key: &str) -> StorageResult<Option<Value>> {
        let areas = self.areas.read().await;
        Ok(areas.get(&area).and_then(|m| m.get(key)).cloned())
    }

    async fn set(&self, area: StoreArea, key: &str, value: Value) -> StorageResult<()> {
        let mut areas = self.areas.write().await;
        areas.entry(area).or_default().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, area: StoreArea, key: &str) -> StorageResult<()> {
        let mut areas = self.areas.write().await;
        if let Some(map) = areas.get_mut(&area) {
            map.remove(key);
        }
        Ok(())
    }

    async fn snapshot(&self, area: StoreArea) -> StorageResult<HashMap<String, Value>> {
        let areas = self.areas.read().await;
        Ok(areas.get(&area).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn set_get_roundtrip() {
        let backend = MemoryBackend::new();
        backend
            .set(StoreArea::Local, "k", json!({"v": 1}))
            .await
            .unwrap();

        let value = backend.get(StoreArea::Local, "k").await.unwrap();
        assert_eq!(value, Some(json!({"v": 1})));
    }

    #[tokio::test]
    async fn areas_are_isolated() {
        let backend = MemoryBackend::new();
        backend
            .set(StoreArea::Sync, "k", json!("sync"))
            .await
            .unwrap();

        assert_eq!(backend.get(StoreArea::Local, "k").await.unwrap(), None);
        assert_eq!(
            backend.get(StoreArea::Sync, "k").await.unwrap(),
            Some(json!("sync"))
        );
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let backend = MemoryBackend::new();
        backend
            .set(StoreArea::Local, "k", json!(true))
            .await
            .unwrap();

        backend.remove(StoreArea::Local, "k").await.unwrap();
        backend.remove(StoreArea::Local, "k").await.unwrap();
        assert_eq!(backend.get(StoreArea::Local, "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn snapshot_copies_the_whole_area() {
        let backend = MemoryBackend::new();
        backend.set(StoreArea::Local, "a", json!(1)).await.unwrap();
        backend.set(StoreArea::Local, "b", json!(2)).await.unwrap();

        let snapshot = backend.snapshot(StoreArea::Local).await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["a"], json!(1));

        // mutating after the snapshot does not affect the copy
        backend.set(StoreArea::Local, "c", json!(3)).await.unwrap();
        assert_eq!(snapshot.len(), 2);
    }
}
