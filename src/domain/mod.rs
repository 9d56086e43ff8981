//! Core domain types shared by the broker, stores, and providers.

mod analysis;
mod email;
mod feedback;
pub mod request;
mod trustlist;

pub use analysis::{AnalysisResult, AnalysisStats, RiskFlag, RiskLevel};
pub use email::{EmailData, TabId};
pub use feedback::{Feedback, FeedbackType};
pub use request::{ContextKind, Request, RequestDecodeError, Response, Sender, UNKNOWN_MESSAGE_TYPE};
pub use trustlist::{TrustListEntry, TrustListKind, TrustLists};
