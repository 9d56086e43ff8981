//! Remote analysis service client.

mod http;
mod traits;

pub use http::HttpAnalysisClient;
pub use traits::{AnalysisApi, ApiError, ApiResult, FeedbackAck, HealthStatus};

#[cfg(test)]
pub use traits::MockAnalysisApi;
