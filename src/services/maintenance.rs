//! Scheduled background maintenance.
//!
//! Two independent periodic tasks: cache eviction and a service health
//! check. Both are best-effort; a tick missed while the process was not
//! resident is skipped silently, and neither task ever blocks request
//! handling.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::providers::AnalysisApi;
use crate::storage::{CacheStore, SettingsStore, StorageBackend};

/// Intervals and cutoffs for the maintenance tasks.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// How often cache eviction runs.
    pub eviction_interval: Duration,
    /// Entries older than this are evicted.
    pub cache_max_age: chrono::Duration,
    /// How often the service health check runs.
    pub health_interval: Duration,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            eviction_interval: Duration::from_secs(24 * 60 * 60),
            cache_max_age: chrono::Duration::days(7),
            health_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Handle to the two running maintenance loops.
pub struct MaintenanceScheduler {
    eviction: JoinHandle<()>,
    health: JoinHandle<()>,
}

impl MaintenanceScheduler {
    /// Starts both loops. The first tick of each fires one full interval
    /// after spawn, not immediately.
    ///
    /// The health loop re-reads settings on every tick so it always
    /// checks the currently configured service.
    pub fn spawn<B: StorageBackend>(
        cache: CacheStore<B>,
        settings: SettingsStore<B>,
        api: Arc<dyn AnalysisApi>,
        config: MaintenanceConfig,
    ) -> Self {
        let max_age = config.cache_max_age;
        let eviction = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.eviction_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await; // consume the immediate first tick

            loop {
                ticker.tick().await;
                if let Err(e) = cache.evict_older_than(max_age).await {
                    tracing::warn!("cache eviction failed: {e}");
                }
            }
        });

        let health = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.health_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let api_url = match settings.get().await {
                    Ok(settings) => settings.api_url,
                    Err(e) => {
                        tracing::warn!("could not read settings for health check: {e}");
                        continue;
                    }
                };

                // diagnostic only: log, never surface to a UI
                match api.health(&api_url).await {
                    Ok(status) => {
                        tracing::debug!(version = %status.version, "analysis service healthy")
                    }
                    Err(e) => tracing::warn!("API health check failed: {e}"),
                }
            }
        });

        Self { eviction, health }
    }

    /// Stops both loops.
    pub fn shutdown(self) {
        self.eviction.abort();
        self.health.abort();
    }
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler").finish_non_exhaustive()
    }
}
