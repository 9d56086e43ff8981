//! Durable state behind narrow store interfaces.
//!
//! This module provides the storage layer for the broker core:
//!
//! - A [`StorageBackend`] abstraction over the host's synchronized and
//!   device-local key/value areas
//! - An in-memory backend and a SQLite backend (async-safe via
//!   `tokio::task::spawn_blocking`)
//! - Typed stores for settings, the analysis cache, and trust lists
//!
//! No component outside this module ever touches the persistence
//! primitive directly; all cross-context access goes through the stores'
//! get/set contracts.

mod backend;
mod cache_store;
mod settings_store;
mod sqlite;
mod trustlist_store;

pub use backend::{MemoryBackend, StorageBackend, StorageError, StorageResult, StoreArea};
pub use cache_store::{CacheEntry, CacheStore, CACHE_KEY_PREFIX};
pub use settings_store::SettingsStore;
pub use sqlite::SqliteBackend;
pub use trustlist_store::{TrustListError, TrustListStore};

use std::sync::Arc;

/// The stores the broker shares, over one backend.
#[derive(Debug, Clone)]
pub struct StorageLayer<B> {
    settings: SettingsStore<B>,
    cache: CacheStore<B>,
    trust: TrustListStore<B>,
}

impl<B: StorageBackend> StorageLayer<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            settings: SettingsStore::new(backend.clone()),
            cache: CacheStore::new(backend.clone()),
            trust: TrustListStore::new(backend),
        }
    }

    pub fn settings(&self) -> &SettingsStore<B> {
        &self.settings
    }

    pub fn cache(&self) -> &CacheStore<B> {
        &self.cache
    }

    pub fn trust(&self) -> &TrustListStore<B> {
        &self.trust
    }
}

impl StorageLayer<MemoryBackend> {
    /// A storage layer over a fresh in-memory backend, for tests and
    /// hosts that bridge persistence themselves.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }
}
