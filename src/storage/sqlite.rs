//! SQLite-backed storage for hosts that persist state on disk.
//!
//! A single `kv` table holds both storage areas. All connection access runs
//! via `tokio::task::spawn_blocking` to keep the async runtime unblocked.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use tokio::sync::Mutex;

use super::backend::{StorageBackend, StorageError, StorageResult, StoreArea};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    area TEXT NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (area, key)
);
";

/// Thread-safe SQLite storage backend.
#[derive(Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Opens (and if necessary creates) the database at the given path.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let conn = tokio::task::spawn_blocking(move || -> StorageResult<Connection> {
            let conn = Connection::open(&path)?;
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|e| StorageError::TaskFailed(e.to_string()))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens the database at the platform default data directory.
    pub async fn open_default() -> StorageResult<Self> {
        let dirs = directories::ProjectDirs::from("com", "phishshield", "phishshield")
            .ok_or_else(|| StorageError::Unavailable("no home directory".to_string()))?;

        let data_dir = dirs.data_dir().to_path_buf();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Self::open(data_dir.join("storage.db")).await
    }

    /// Opens an in-memory database for testing.
    pub async fn open_in_memory() -> StorageResult<Self> {
        let conn = tokio::task::spawn_blocking(|| -> StorageResult<Connection> {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .map_err(|e| StorageError::TaskFailed(e.to_string()))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|e| StorageError::TaskFailed(e.to_string()))?
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn get(&self, area: StoreArea, key: &str) -> StorageResult<Option<Value>> {
        let key = key.to_string();

        self.with_conn(move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT value FROM kv WHERE area = ?1 AND key = ?2",
                    (area.as_str(), &key),
                    |row| row.get(0),
                )
                .optional()?;

            raw.map(|s| {
                serde_json::from_str(&s).map_err(|e| StorageError::InvalidShape(e.to_string()))
            })
            .transpose()
        })
        .await
    }

    async fn set(&self, area: StoreArea, key: &str, value: Value) -> StorageResult<()> {
        let key = key.to_string();
        let raw = value.to_string();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv (area, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (area, key) DO UPDATE SET value = ?3, updated_at = ?4",
                (area.as_str(), &key, &raw, Utc::now().to_rfc3339()),
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, area: StoreArea, key: &str) -> StorageResult<()> {
        let key = key.to_string();

        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM kv WHERE area = ?1 AND key = ?2",
                (area.as_str(), &key),
            )?;
            Ok(())
        })
        .await
    }

    async fn snapshot(&self, area: StoreArea) -> StorageResult<HashMap<String, Value>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM kv WHERE area = ?1")?;
            let rows = stmt.query_map([area.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut map = HashMap::new();
            for row in rows {
                let (key, raw) = row?;
                let value = serde_json::from_str(&raw)
                    .map_err(|e| StorageError::InvalidShape(e.to_string()))?;
                map.insert(key, value);
            }
            Ok(map)
        })
        .await
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend").finish_non_exhaustive()
    }
}
