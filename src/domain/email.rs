//! Email data as extracted from a webmail page.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Identifier of a browser tab, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub i64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The currently displayed email, as reported by a provider extractor.
///
/// `message_id` is always non-empty. When the source page exposes no stable
/// identifier the extractor generates a synthetic, session-scoped one via
/// [`EmailData::synthetic_message_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailData {
    pub subject: String,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    pub body: String,
    /// URLs found in the email body.
    #[serde(default)]
    pub links: Vec<String>,
    /// Raw headers, when the page exposes them (used for SPF/DKIM checks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Attachment names or MIME types.
    #[serde(default)]
    pub attachments: Vec<String>,
    pub message_id: String,
}

impl EmailData {
    /// Creates email data with the given identity fields and an explicit
    /// message id.
    pub fn new(
        subject: impl Into<String>,
        from: impl Into<String>,
        body: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            from: from.into(),
            to: Vec::new(),
            body: body.into(),
            links: Vec::new(),
            headers: None,
            attachments: Vec::new(),
            message_id: message_id.into(),
        }
    }

    /// Generates a synthetic message id of the form
    /// `<provider>_<timestamp>_<random>`.
    ///
    /// Synthetic ids are session-scoped: the same email viewed again later
    /// will get a different id, so they must not be treated as globally
    /// stable.
    pub fn synthetic_message_id(provider: &str) -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}_{}_{}",
            provider,
            Utc::now().timestamp_millis(),
            &random[..8]
        )
    }

    /// Replaces an empty `message_id` with a synthetic one for the given
    /// provider. Returns `self` for chaining.
    pub fn ensure_message_id(mut self, provider: &str) -> Self {
        if self.message_id.is_empty() {
            self.message_id = Self::synthetic_message_id(provider);
        }
        self
    }

    pub fn with_to(mut self, to: Vec<String>) -> Self {
        self.to = to;
        self
    }

    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn synthetic_id_has_provider_prefix() {
        let id = EmailData::synthetic_message_id("gmail");
        assert!(id.starts_with("gmail_"));
        assert_eq!(id.split('_').count(), 3);
    }

    #[test]
    fn synthetic_ids_are_unique() {
        let a = EmailData::synthetic_message_id("outlook");
        let b = EmailData::synthetic_message_id("outlook");
        assert_ne!(a, b);
    }

    #[test]
    fn ensure_message_id_fills_empty_only() {
        let filled = EmailData::new("Hi", "a@example.com", "body", "").ensure_message_id("gmail");
        assert!(!filled.message_id.is_empty());
        assert!(filled.message_id.starts_with("gmail_"));

        let kept =
            EmailData::new("Hi", "a@example.com", "body", "msg-1").ensure_message_id("gmail");
        assert_eq!(kept.message_id, "msg-1");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let email = EmailData::new("Invoice", "billing@example.com", "Pay now", "msg-42")
            .with_to(vec!["me@example.com".to_string()])
            .with_links(vec!["https://example.com/pay".to_string()]);

        let json = serde_json::to_string(&email).unwrap();
        assert!(json.contains("\"from\":\"billing@example.com\""));
        assert!(json.contains("\"message_id\":\"msg-42\""));
        // headers are omitted entirely when absent
        assert!(!json.contains("headers"));
    }

    #[test]
    fn deserializes_minimal_payload() {
        let json = r#"{
            "subject": "Hello",
            "from": "a@example.com",
            "body": "hi",
            "message_id": "m1"
        }"#;

        let email: EmailData = serde_json::from_str(json).unwrap();
        assert!(email.to.is_empty());
        assert!(email.links.is_empty());
        assert!(email.attachments.is_empty());
        assert_eq!(email.headers, None);
    }
}
