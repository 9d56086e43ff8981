//! Durable whitelist/blacklist store.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{TrustListEntry, TrustListKind, TrustLists};

use super::backend::{StorageBackend, StorageError, StorageResult, StoreArea};

/// Errors specific to trust list writes.
#[derive(Debug, Error)]
pub enum TrustListError {
    /// The address is already on the other list. Membership is exclusive;
    /// the caller must remove it there first.
    #[error("{address} is already on the {other} list")]
    ConflictingList {
        address: String,
        other: TrustListKind,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Narrow interface over the two named trust lists.
///
/// Addresses are case-normalized before comparison, so `User@Example.com`
/// and `user@example.com` are the same entry.
#[derive(Debug, Clone)]
pub struct TrustListStore<B> {
    backend: Arc<B>,
}

impl<B: StorageBackend> TrustListStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    fn normalize(address: &str) -> String {
        address.trim().to_ascii_lowercase()
    }

    async fn read(&self, kind: TrustListKind) -> StorageResult<Vec<TrustListEntry>> {
        let value = self
            .backend
            .get(StoreArea::Local, kind.storage_key())
            .await?;

        Ok(value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default())
    }

    async fn write(&self, kind: TrustListKind, entries: &[TrustListEntry]) -> StorageResult<()> {
        let value = serde_json::to_value(entries)
            .map_err(|e| StorageError::InvalidShape(e.to_string()))?;
        self.backend
            .set(StoreArea::Local, kind.storage_key(), value)
            .await
    }

    /// Adds an address to a list.
    ///
    /// Idempotent for an address already on the same list; rejected if the
    /// address is on the opposite list.
    pub async fn add(&self, kind: TrustListKind, address: &str) -> Result<(), TrustListError> {
        let normalized = Self::normalize(address);

        let opposite = kind.opposite();
        let other = self.read(opposite).await?;
        if other.iter().any(|e| e.email_address == normalized) {
            return Err(TrustListError::ConflictingList {
                address: normalized,
                other: opposite,
            });
        }

        let mut entries = self.read(kind).await?;
        if entries.iter().any(|e| e.email_address == normalized) {
            return Ok(());
        }

        entries.push(TrustListEntry::new(normalized));
        self.write(kind, &entries).await?;
        Ok(())
    }

    /// Removes an address from a list. Removing an absent address is a
    /// no-op.
    pub async fn remove(&self, kind: TrustListKind, address: &str) -> StorageResult<()> {
        let normalized = Self::normalize(address);

        let mut entries = self.read(kind).await?;
        let before = entries.len();
        entries.retain(|e| e.email_address != normalized);

        if entries.len() != before {
            self.write(kind, &entries).await?;
        }
        Ok(())
    }

    pub async fn get(&self, kind: TrustListKind) -> StorageResult<Vec<TrustListEntry>> {
        self.read(kind).await
    }

    pub async fn get_all(&self) -> StorageResult<TrustLists> {
        Ok(TrustLists {
            whitelist: self.read(TrustListKind::Whitelist).await?,
            blacklist: self.read(TrustListKind::Blacklist).await?,
        })
    }
}
