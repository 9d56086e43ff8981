//! User feedback on analysis results.

use serde::{Deserialize, Serialize};

/// Kind of feedback a user can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    /// The user believes the email is legitimate.
    MarkSafe,
    /// The user is reporting the email as phishing.
    ReportPhishing,
    /// The analysis flagged a legitimate email.
    FalsePositive,
}

/// Feedback constructed by a UI context from the last displayed analysis.
///
/// `is_phishing` and `feedback_type` are not cross-validated here; keeping
/// them consistent is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub message_id: String,
    pub is_phishing: bool,
    pub feedback_type: FeedbackType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Feedback {
    pub fn new(message_id: impl Into<String>, is_phishing: bool, feedback_type: FeedbackType) -> Self {
        Self {
            message_id: message_id.into(),
            is_phishing,
            feedback_type,
            comments: None,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }
}
