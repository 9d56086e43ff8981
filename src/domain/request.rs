//! The typed request/response surface between extension contexts and the
//! broker.
//!
//! Every context (content script, popup, options page) talks to the broker
//! exclusively through a [`Request`] and receives exactly one [`Response`]
//! per accepted request. The wire format keeps the original `type` tag and
//! camelCase payload fields so existing UI contexts stay compatible.

use serde::{Deserialize, Serialize};

use crate::config::SettingsPatch;
use crate::domain::{EmailData, Feedback, TabId, TrustListKind};

/// Error message returned for a request whose `type` tag the broker does
/// not recognize. This is a caller bug, not a system failure.
pub const UNKNOWN_MESSAGE_TYPE: &str = "Unknown message type";

/// All request kinds the broker accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all_fields = "camelCase")]
pub enum Request {
    /// Analyze extracted email data via the remote analysis service.
    AnalyzeEmail { email_data: EmailData },
    /// Extract the currently open email from the sender's tab.
    GetCurrentEmail,
    /// Forward user feedback on a previous analysis to the service.
    SubmitFeedback { feedback: Feedback },
    /// Acquire an OAuth token for the named provider ("google"/"microsoft").
    OauthAuthorize { provider: String },
    /// Read the merged settings map.
    GetSettings,
    /// Apply a partial settings update.
    UpdateSettings { settings: SettingsPatch },
    /// Add an address to one of the trust lists.
    AddToTrustlist {
        list_type: TrustListKind,
        email: String,
    },
    /// Remove an address from one of the trust lists.
    RemoveFromTrustlist {
        list_type: TrustListKind,
        email: String,
    },
    /// Read both trust lists.
    GetTrustlists,
    /// Read aggregate scan statistics.
    GetStatistics,
    /// Show a system notification on behalf of a content script.
    ShowNotification { title: String, message: String },
    /// Ask the host to open the extension popup.
    OpenPopup,
}

/// Wire tags of every request kind, used to distinguish an unknown kind
/// from a malformed payload of a known kind.
const KNOWN_KINDS: &[&str] = &[
    "ANALYZE_EMAIL",
    "GET_CURRENT_EMAIL",
    "SUBMIT_FEEDBACK",
    "OAUTH_AUTHORIZE",
    "GET_SETTINGS",
    "UPDATE_SETTINGS",
    "ADD_TO_TRUSTLIST",
    "REMOVE_FROM_TRUSTLIST",
    "GET_TRUSTLISTS",
    "GET_STATISTICS",
    "SHOW_NOTIFICATION",
    "OPEN_POPUP",
];

/// Why a raw payload could not be decoded into a [`Request`].
#[derive(Debug, thiserror::Error)]
pub enum RequestDecodeError {
    /// The payload carries no `type` tag at all.
    #[error("{UNKNOWN_MESSAGE_TYPE}")]
    MissingKind,
    /// The `type` tag is not one of the known request kinds.
    #[error("{UNKNOWN_MESSAGE_TYPE}")]
    UnknownKind(String),
    /// The tag is known but the payload does not match its shape.
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: String,
        source: serde_json::Error,
    },
}

impl Request {
    /// Decodes a raw wire payload.
    ///
    /// Unknown or missing tags are rejected with an error that renders as
    /// exactly [`UNKNOWN_MESSAGE_TYPE`]; they are never silently ignored.
    pub fn from_value(value: serde_json::Value) -> Result<Self, RequestDecodeError> {
        let kind = value
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(RequestDecodeError::MissingKind)?
            .to_string();

        if !KNOWN_KINDS.contains(&kind.as_str()) {
            return Err(RequestDecodeError::UnknownKind(kind));
        }

        serde_json::from_value(value)
            .map_err(|source| RequestDecodeError::InvalidPayload { kind, source })
    }

    /// The wire tag of this request, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::AnalyzeEmail { .. } => "ANALYZE_EMAIL",
            Request::GetCurrentEmail => "GET_CURRENT_EMAIL",
            Request::SubmitFeedback { .. } => "SUBMIT_FEEDBACK",
            Request::OauthAuthorize { .. } => "OAUTH_AUTHORIZE",
            Request::GetSettings => "GET_SETTINGS",
            Request::UpdateSettings { .. } => "UPDATE_SETTINGS",
            Request::AddToTrustlist { .. } => "ADD_TO_TRUSTLIST",
            Request::RemoveFromTrustlist { .. } => "REMOVE_FROM_TRUSTLIST",
            Request::GetTrustlists => "GET_TRUSTLISTS",
            Request::GetStatistics => "GET_STATISTICS",
            Request::ShowNotification { .. } => "SHOW_NOTIFICATION",
            Request::OpenPopup => "OPEN_POPUP",
        }
    }
}

/// Which kind of context sent a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// A content script running inside a webmail tab.
    Content,
    /// The extension popup.
    Popup,
    /// The options page.
    Options,
}

/// Sender metadata accompanying each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// The originating tab, when the sender is a content script.
    pub tab_id: Option<TabId>,
    pub context: ContextKind,
}

impl Sender {
    /// A content script in the given tab.
    pub fn tab(tab_id: TabId) -> Self {
        Self {
            tab_id: Some(tab_id),
            context: ContextKind::Content,
        }
    }

    pub fn popup() -> Self {
        Self {
            tab_id: None,
            context: ContextKind::Popup,
        }
    }

    pub fn options() -> Self {
        Self {
            tab_id: None,
            context: ContextKind::Options,
        }
    }
}

/// The single response envelope delivered for every accepted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// A success response carrying serialized data.
    ///
    /// A value that fails to serialize is reported as a failure response
    /// rather than panicking across the channel.
    pub fn ok(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                success: true,
                data: Some(value),
                error: None,
            },
            Err(e) => Self::err(format!("failed to encode response data: {e}")),
        }
    }

    /// A success response with no payload.
    pub fn ack() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
