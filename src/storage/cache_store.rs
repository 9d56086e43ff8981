//! Device-local cache of recent analysis results.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisResult, AnalysisStats, EmailData};

use super::backend::{StorageBackend, StorageResult, StoreArea};

/// Prefix of every cache key in the local area.
pub const CACHE_KEY_PREFIX: &str = "analysis_";

/// One cached analysis, keyed by `analysis_<message_id>`.
///
/// Created on every successful analysis, read by the popup and options
/// page, and destroyed by scheduled eviction after seven days (or
/// overwritten by a newer analysis of the same message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub result: AnalysisResult,
    #[serde(rename = "emailData")]
    pub email_data: EmailData,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(result: AnalysisResult, email_data: EmailData) -> Self {
        Self {
            result,
            email_data,
            timestamp: Utc::now(),
        }
    }
}

/// Narrow interface over the local analysis cache.
#[derive(Debug, Clone)]
pub struct CacheStore<B> {
    backend: Arc<B>,
}

impl<B: StorageBackend> CacheStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    fn key(message_id: &str) -> String {
        format!("{CACHE_KEY_PREFIX}{message_id}")
    }

    /// Stores an analysis under the email's message id. A concurrent write
    /// for the same message is last-write-wins; the value is derived
    /// deterministically from its inputs, so no read-modify-write is needed.
    pub async fn put(&self, result: AnalysisResult, email_data: EmailData) -> StorageResult<()> {
        self.put_entry(CacheEntry::new(result, email_data)).await
    }

    /// Stores a pre-built entry, keeping its timestamp.
    pub async fn put_entry(&self, entry: CacheEntry) -> StorageResult<()> {
        let key = Self::key(&entry.email_data.message_id);
        let value = serde_json::to_value(&entry)
            .map_err(|e| super::StorageError::InvalidShape(e.to_string()))?;
        self.backend.set(StoreArea::Local, &key, value).await
    }

    pub async fn get(&self, message_id: &str) -> StorageResult<Option<CacheEntry>> {
        let value = self.backend.get(StoreArea::Local, &Self::key(message_id)).await?;
        Ok(value.and_then(|v| serde_json::from_value(v).ok()))
    }

    /// Removes every cache entry older than `max_age`. Returns how many
    /// entries were removed.
    ///
    /// Scans the local area once. Keys without the cache prefix, and
    /// prefixed values that do not parse as entries, are left untouched;
    /// unrelated state shares this area.
    pub async fn evict_older_than(&self, max_age: Duration) -> StorageResult<usize> {
        let cutoff = Utc::now() - max_age;
        let snapshot = self.backend.snapshot(StoreArea::Local).await?;

        let mut removed = 0;
        for (key, value) in snapshot {
            if !key.starts_with(CACHE_KEY_PREFIX) {
                continue;
            }
            let Ok(entry) = serde_json::from_value::<CacheEntry>(value) else {
                continue;
            };
            if entry.timestamp < cutoff {
                self.backend.remove(StoreArea::Local, &key).await?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "evicted stale analysis cache entries");
        }
        Ok(removed)
    }

    /// Aggregates scan statistics over every cached entry.
    pub async fn stats(&self) -> StorageResult<AnalysisStats> {
        let snapshot = self.backend.snapshot(StoreArea::Local).await?;

        let entries: Vec<CacheEntry> = snapshot
            .into_iter()
            .filter(|(key, _)| key.starts_with(CACHE_KEY_PREFIX))
            .filter_map(|(_, value)| serde_json::from_value(value).ok())
            .collect();

        if entries.is_empty() {
            return Ok(AnalysisStats::default());
        }

        let total_scans = entries.len();
        let threats_blocked = entries
            .iter()
            .filter(|e| e.result.risk_level.is_alert())
            .count();
        let score_sum: f64 = entries.iter().map(|e| e.result.risk_score).sum();
        let last_scan = entries.iter().map(|e| e.timestamp).max();

        Ok(AnalysisStats {
            total_scans,
            threats_blocked,
            avg_risk_score: (score_sum / total_scans as f64 * 10.0).round() / 10.0,
            last_scan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLevel;
    use crate::storage::MemoryBackend;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn result(level: RiskLevel, score: f64) -> AnalysisResult {
        AnalysisResult {
            risk_score: score,
            risk_level: level,
            flags: Vec::new(),
            recommendations: Vec::new(),
            analysis_time: None,
            whitelisted: false,
            blacklisted: false,
        }
    }

    fn entry_at(message_id: &str, level: RiskLevel, score: f64, age: Duration) -> CacheEntry {
        CacheEntry {
            result: result(level, score),
            email_data: EmailData::new("s", "f@example.com", "b", message_id),
            timestamp: Utc::now() - age,
        }
    }

    fn store() -> (Arc<MemoryBackend>, CacheStore<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (backend.clone(), CacheStore::new(backend))
    }

    #[tokio::test]
    async fn put_and_get_by_message_id() {
        let (_, store) = store();
        store
            .put(result(RiskLevel::Low, 20.0), EmailData::new("s", "f", "b", "m1"))
            .await
            .unwrap();

        let entry = store.get("m1").await.unwrap().unwrap();
        assert_eq!(entry.result.risk_level, RiskLevel::Low);
        assert_eq!(entry.email_data.message_id, "m1");
        assert!(store.get("m2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn newer_analysis_overwrites_same_message() {
        let (_, store) = store();
        store
            .put(result(RiskLevel::Low, 20.0), EmailData::new("s", "f", "b", "m1"))
            .await
            .unwrap();
        store
            .put(result(RiskLevel::High, 80.0), EmailData::new("s", "f", "b", "m1"))
            .await
            .unwrap();

        let entry = store.get("m1").await.unwrap().unwrap();
        assert_eq!(entry.result.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn eviction_removes_only_entries_past_cutoff() {
        let (_, store) = store();
        store
            .put_entry(entry_at("old", RiskLevel::Safe, 1.0, Duration::days(8)))
            .await
            .unwrap();
        store
            .put_entry(entry_at("recent", RiskLevel::Safe, 1.0, Duration::days(6)))
            .await
            .unwrap();
        store
            .put_entry(entry_at("fresh", RiskLevel::Safe, 1.0, Duration::days(1)))
            .await
            .unwrap();

        let removed = store.evict_older_than(Duration::days(7)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("old").await.unwrap().is_none());
        assert!(store.get("recent").await.unwrap().is_some());
        assert!(store.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn eviction_ignores_unrelated_keys_and_shapes() {
        let (backend, store) = store();
        backend
            .set(StoreArea::Local, "whitelist", json!([{"email_address": "a@b.c"}]))
            .await
            .unwrap();
        backend
            .set(StoreArea::Local, "analysis_broken", json!("not an entry"))
            .await
            .unwrap();

        let removed = store.evict_older_than(Duration::days(7)).await.unwrap();
        assert_eq!(removed, 0);
        assert!(backend
            .get(StoreArea::Local, "whitelist")
            .await
            .unwrap()
            .is_some());
        assert!(backend
            .get(StoreArea::Local, "analysis_broken")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn stats_on_empty_cache_are_zeroed() {
        let (_, store) = store();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats, AnalysisStats::default());
    }

    #[tokio::test]
    async fn stats_aggregate_cached_entries() {
        let (_, store) = store();
        store
            .put_entry(entry_at("a", RiskLevel::Safe, 10.0, Duration::hours(3)))
            .await
            .unwrap();
        store
            .put_entry(entry_at("b", RiskLevel::High, 80.0, Duration::hours(2)))
            .await
            .unwrap();
        store
            .put_entry(entry_at("c", RiskLevel::Critical, 96.0, Duration::hours(1)))
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_scans, 3);
        assert_eq!(stats.threats_blocked, 2);
        assert_eq!(stats.avg_risk_score, 62.0);
        assert!(stats.last_scan.is_some());
    }
}
