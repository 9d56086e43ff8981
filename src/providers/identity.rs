//! OAuth token hand-off.
//!
//! The actual interactive flow lives in the host (browser identity APIs);
//! this module only defines the hand-off contract and the token shape the
//! broker persists.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mail providers a token can be acquired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Microsoft,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Microsoft => "microsoft",
        }
    }

    /// Storage key the acquired token is persisted under (local area).
    pub fn token_key(self) -> String {
        format!("oauth_{}", self.as_str())
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            "microsoft" => Ok(OAuthProvider::Microsoft),
            _ => Err(IdentityError::UnsupportedProvider),
        }
    }
}

/// Errors that can occur during token acquisition.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider name is not one UI contexts are allowed to send. The
    /// message deliberately carries no detail; it is an exact wire string.
    #[error("Unsupported OAuth provider")]
    UnsupportedProvider,

    /// The host registered no identity flow with the broker.
    #[error("OAuth is not available in this host")]
    NotAvailable,

    #[error("authorization failed: {0}")]
    Failed(String),
}

/// An acquired token plus its expiry, as persisted by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
    pub provider: OAuthProvider,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Tokens from the host identity API are valid for one hour.
    pub fn ttl() -> Duration {
        Duration::hours(1)
    }

    pub fn new(token: impl Into<String>, provider: OAuthProvider) -> Self {
        Self {
            token: token.into(),
            provider,
            expires_at: Utc::now() + Self::ttl(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Host-side interactive token acquisition.
#[async_trait]
pub trait IdentityFlow: Send + Sync {
    /// Runs the interactive flow and returns the raw access token.
    async fn acquire_token(&self, provider: OAuthProvider) -> Result<String, IdentityError>;
}
