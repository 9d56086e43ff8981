//! HTTP implementation of the analysis API.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::domain::{AnalysisResult, EmailData, Feedback};

use super::traits::{AnalysisApi, ApiError, ApiResult, FeedbackAck, HealthStatus};

/// Bound on any single request. A hang beyond this is reported as an HTTP
/// failure; slow-but-alive servers are indistinguishable and also fail.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the analysis service's `/analyze`, `/feedback`, and
/// `/health` endpoints. Single attempt per call, no retry.
///
/// The client holds no base URL of its own: each call builds its endpoint
/// from the `api_url` the caller passes, so it always targets whatever the
/// current settings name.
pub struct HttpAnalysisClient {
    client: reqwest::Client,
}

impl HttpAnalysisClient {
    pub fn new() -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Joins a base URL and endpoint path, validating the base first. A
    /// bad `apiUrl` setting surfaces here, per request, as a typed error.
    fn endpoint(api_url: &str, path: &str) -> ApiResult<String> {
        let url =
            Url::parse(api_url).map_err(|e| ApiError::InvalidBaseUrl(format!("{api_url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(format!(
                "{api_url}: unsupported scheme {}",
                url.scheme()
            )));
        }

        Ok(format!("{}/{}", api_url.trim_end_matches('/'), path))
    }

    async fn handle_error_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        ApiError::Api {
            status: status.as_u16(),
            message: error_message_from_body(&status, &body),
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ApiResult<T> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Extracts a useful message from an error body. The service reports
/// errors as `{"detail": "..."}`; anything else falls back to the status
/// reason or the raw body, truncated.
fn error_message_from_body(status: &reqwest::StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        let mut message = trimmed.chars().take(200).collect::<String>();
        if trimmed.chars().count() > 200 {
            message.push('…');
        }
        message
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn analyze(&self, email: &EmailData, api_url: &str) -> ApiResult<AnalysisResult> {
        let response = self
            .client
            .post(Self::endpoint(api_url, "analyze")?)
            .json(email)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    async fn submit_feedback(
        &self,
        feedback: &Feedback,
        api_url: &str,
    ) -> ApiResult<FeedbackAck> {
        let response = self
            .client
            .post(Self::endpoint(api_url, "feedback")?)
            .json(feedback)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    async fn health(&self, api_url: &str) -> ApiResult<HealthStatus> {
        let response = self
            .client
            .get(Self::endpoint(api_url, "health")?)
            .send()
            .await?;

        Self::parse_json(response).await
    }
}

impl std::fmt::Debug for HttpAnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAnalysisClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoints_join_without_double_slash() {
        assert_eq!(
            HttpAnalysisClient::endpoint("http://localhost:8000/", "analyze").unwrap(),
            "http://localhost:8000/analyze"
        );
        assert_eq!(
            HttpAnalysisClient::endpoint("http://localhost:8000", "health").unwrap(),
            "http://localhost:8000/health"
        );
        assert_eq!(
            HttpAnalysisClient::endpoint("https://api.example.com", "feedback").unwrap(),
            "https://api.example.com/feedback"
        );
    }

    #[test]
    fn rejects_garbage_base_url() {
        assert!(matches!(
            HttpAnalysisClient::endpoint("not a url", "analyze"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpAnalysisClient::endpoint("ftp://example.com", "analyze"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn error_message_prefers_service_detail() {
        let status = reqwest::StatusCode::UNPROCESSABLE_ENTITY;
        let message = error_message_from_body(&status, r#"{"detail": "body is required"}"#);
        assert_eq!(message, "body is required");
    }

    #[test]
    fn error_message_falls_back_to_reason_for_empty_body() {
        let status = reqwest::StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(
            error_message_from_body(&status, ""),
            "Internal Server Error"
        );
    }

    #[test]
    fn error_message_truncates_long_bodies() {
        let status = reqwest::StatusCode::BAD_GATEWAY;
        let body = "x".repeat(500);
        let message = error_message_from_body(&status, &body);
        assert_eq!(message.chars().count(), 201);
        assert!(message.ends_with('…'));
    }
}
