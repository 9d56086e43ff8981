//! Extraction bridge between the broker and per-tab email extractors.
//!
//! The broker never knows DOM structure. Each webmail page installs a
//! provider-specific [`EmailExtractor`] for its tab; the bridge only looks
//! the extractor up and invokes its single capability.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::{EmailData, TabId};

/// Errors that can occur during extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No extractor is registered for the tab: the page has not finished
    /// installing its extraction logic, or is not a supported provider.
    #[error("Email extractor not available")]
    NotAvailable,

    /// The extractor ran but could not produce email data (e.g. no email
    /// is currently open).
    #[error("{0}")]
    Failed(String),
}

/// A provider-specific capability that reads the currently displayed email.
#[async_trait]
pub trait EmailExtractor: Send + Sync {
    /// Returns the currently open email, or fails if none is open.
    async fn extract_current_email(&self) -> Result<EmailData, ExtractionError>;
}

/// Per-tab registry of installed extractors.
///
/// The bridge never retries: callers needing a race-free view of page
/// readiness must rely on the page's own signaling.
#[derive(Default)]
pub struct ExtractionBridge {
    extractors: RwLock<HashMap<TabId, Arc<dyn EmailExtractor>>>,
}

impl ExtractionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs (or replaces) the extractor for a tab.
    pub async fn register(&self, tab_id: TabId, extractor: Arc<dyn EmailExtractor>) {
        let mut extractors = self.extractors.write().await;
        extractors.insert(tab_id, extractor);
        tracing::debug!(%tab_id, "registered email extractor");
    }

    /// Removes the extractor for a tab, e.g. when it navigates away.
    pub async fn unregister(&self, tab_id: TabId) {
        let mut extractors = self.extractors.write().await;
        extractors.remove(&tab_id);
    }

    /// Runs the tab's extractor once.
    pub async fn extract_from_tab(&self, tab_id: TabId) -> Result<EmailData, ExtractionError> {
        let extractor = {
            let extractors = self.extractors.read().await;
            extractors.get(&tab_id).cloned()
        };

        match extractor {
            Some(extractor) => extractor.extract_current_email().await,
            None => Err(ExtractionError::NotAvailable),
        }
    }
}

impl std::fmt::Debug for ExtractionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionBridge").finish_non_exhaustive()
    }
}
