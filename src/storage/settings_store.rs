//! Durable settings store with defaults-merge semantics.

use std::sync::Arc;

use crate::config::{Settings, SettingsPatch};

use super::backend::{StorageBackend, StorageError, StorageResult, StoreArea};

/// Narrow get/update interface over the synchronized settings keys.
///
/// Settings are persisted as one flat key per field so that partial writes
/// from any context merge naturally instead of clobbering the whole map.
#[derive(Debug)]
pub struct SettingsStore<B> {
    backend: Arc<B>,
}

impl<B> Clone for SettingsStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: StorageBackend> SettingsStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Reads the merged settings: defaults overlaid with every persisted
    /// key. Total over the known key set even when nothing is persisted.
    pub async fn get(&self) -> StorageResult<Settings> {
        let snapshot = self.backend.snapshot(StoreArea::Sync).await?;
        let map: serde_json::Map<String, serde_json::Value> = snapshot.into_iter().collect();

        Settings::from_persisted(map).map_err(|e| StorageError::InvalidShape(e.to_string()))
    }

    /// Writes only the keys present in the patch and returns the merged
    /// settings after the update.
    pub async fn update(&self, patch: &SettingsPatch) -> StorageResult<Settings> {
        for (key, value) in patch.entries() {
            self.backend.set(StoreArea::Sync, &key, value).await?;
        }
        self.get().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLevel;
    use crate::storage::MemoryBackend;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> SettingsStore<MemoryBackend> {
        SettingsStore::new(Arc::new(MemoryBackend::new()))
    }

    #[tokio::test]
    async fn empty_store_returns_exact_defaults() {
        let settings = store().get().await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn update_merges_single_key_over_defaults() {
        let store = store();
        let patch = SettingsPatch {
            risk_threshold: Some(RiskLevel::High),
            ..Default::default()
        };

        let settings = store.update(&patch).await.unwrap();
        assert_eq!(settings.risk_threshold, RiskLevel::High);

        // every other key is still at its default
        let mut expected = Settings::default();
        expected.risk_threshold = RiskLevel::High;
        assert_eq!(settings, expected);
    }

    #[tokio::test]
    async fn updates_accumulate_across_calls() {
        let store = store();
        store
            .update(&SettingsPatch {
                auto_scan: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .update(&SettingsPatch {
                api_url: Some("https://api.example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let settings = store.get().await.unwrap();
        assert!(!settings.auto_scan);
        assert_eq!(settings.api_url, "https://api.example.com");
        assert_eq!(settings.risk_threshold, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn foreign_keys_in_sync_area_are_ignored() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .set(StoreArea::Sync, "legacyFlag", json!("whatever"))
            .await
            .unwrap();

        let store = SettingsStore::new(backend);
        let settings = store.get().await.unwrap();
        assert_eq!(settings, Settings::default());
    }
}
