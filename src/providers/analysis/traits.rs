//! Analysis API trait and supporting types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AnalysisResult, EmailData, Feedback};

/// Errors that can occur talking to the analysis service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: {status} {message}")]
    Api { status: u16, message: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Result type for analysis API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Response of the service's health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub rules_loaded: u64,
}

/// Acknowledgement of a submitted feedback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAck {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The remote analysis service, as the broker sees it.
///
/// Callers pass the service base URL on every call; it comes from the
/// current settings, so an `apiUrl` change takes effect on the next
/// request without rebuilding the client. Implementations make exactly
/// one attempt per call; there is no internal retry. A failed analysis
/// requires the user to trigger another one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Scores an email for phishing risk.
    ///
    /// Never returns a partially populated result: a non-2xx status or a
    /// body that does not parse both surface as an error.
    async fn analyze(&self, email: &EmailData, api_url: &str) -> ApiResult<AnalysisResult>;

    /// Forwards user feedback on a previous analysis.
    async fn submit_feedback(&self, feedback: &Feedback, api_url: &str)
        -> ApiResult<FeedbackAck>;

    /// Checks service liveness. Diagnostic only; callers log failures
    /// instead of surfacing them.
    async fn health(&self, api_url: &str) -> ApiResult<HealthStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn api_error_message_carries_status_code() {
        let err = ApiError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API request failed: 500 Internal Server Error"
        );
    }

    #[test]
    fn health_status_parses_service_response() {
        let json = r#"{
            "status": "healthy",
            "version": "1.2.0",
            "uptime": 3600.5,
            "rules_loaded": 42
        }"#;

        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert_eq!(health.version, "1.2.0");
        assert_eq!(health.rules_loaded, 42);
    }

    #[test]
    fn health_status_tolerates_minimal_response() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "ok", "version": "0.1"}"#).unwrap();
        assert_eq!(health.uptime, 0.0);
        assert_eq!(health.rules_loaded, 0);
    }

    #[test]
    fn feedback_ack_tolerates_empty_body() {
        let ack: FeedbackAck = serde_json::from_str("{}").unwrap();
        assert_eq!(ack.status, "");
        assert_eq!(ack.message, None);
    }
}
