//! Host-side visual effects.
//!
//! Badge mutation, system notifications, and popup opening are performed
//! by the embedding host (browser action/notification APIs). They are a
//! fire-and-forget side channel: failures are logged by the caller and
//! never folded into a request's response.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a host surface.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host surface error: {0}")]
    Failed(String),
}

/// The user-visible surfaces the host exposes to the broker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostSurface: Send + Sync {
    /// Sets the extension badge text and background color.
    async fn set_badge(&self, text: &str, color: &str) -> Result<(), HostError>;

    /// Clears the extension badge.
    async fn clear_badge(&self) -> Result<(), HostError>;

    /// Shows a system notification.
    async fn show_notification(&self, title: &str, message: &str) -> Result<(), HostError>;

    /// Opens the extension popup.
    async fn open_popup(&self) -> Result<(), HostError>;
}

/// A host surface that does nothing, for tests and headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

#[async_trait]
impl HostSurface for NoopHost {
    async fn set_badge(&self, _text: &str, _color: &str) -> Result<(), HostError> {
        Ok(())
    }

    async fn clear_badge(&self) -> Result<(), HostError> {
        Ok(())
    }

    async fn show_notification(&self, _title: &str, _message: &str) -> Result<(), HostError> {
        Ok(())
    }

    async fn open_popup(&self) -> Result<(), HostError> {
        Ok(())
    }
}
