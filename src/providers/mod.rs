//! Outbound capability boundaries.
//!
//! Everything the broker needs from the outside world lives behind a trait
//! in this module: the remote analysis service, per-tab email extractors,
//! OAuth token acquisition, and host-side visual effects.

pub mod analysis;
pub mod extractor;
pub mod host;
pub mod identity;

pub use analysis::{AnalysisApi, ApiError, ApiResult, HttpAnalysisClient};
pub use extractor::{EmailExtractor, ExtractionBridge, ExtractionError};
pub use host::{HostError, HostSurface, NoopHost};
pub use identity::{AuthToken, IdentityError, IdentityFlow, OAuthProvider};
