//! Analysis result types returned by the remote analysis service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordinal risk category summarizing an analysis result.
///
/// Variants are declared in ascending order of severity so that the derived
/// `Ord` matches `safe < low < medium < high < critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Whether this level warrants an alert notification.
    pub fn is_alert(self) -> bool {
        self >= RiskLevel::High
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single risk indicator raised by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlag {
    /// Kind of risk detected (e.g. "suspicious_link", "spoofed_sender").
    #[serde(rename = "type")]
    pub flag_type: String,
    /// Severity assigned to this flag.
    pub severity: RiskLevel,
    /// Human-readable description.
    pub description: String,
    /// Additional detail, if the service provided any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// The pattern that triggered this flag, if rule-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
}

/// Result of analyzing one email.
///
/// `flags` and `recommendations` keep the order the service produced them
/// in; consumers may truncate for display but never reorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Overall risk score, 0 to 100.
    pub risk_score: f64,
    /// Risk category derived from the score.
    pub risk_level: RiskLevel,
    /// Individual risk indicators, in producer order.
    #[serde(default)]
    pub flags: Vec<RiskFlag>,
    /// Security recommendations, in producer order.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Server-side analysis duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_time: Option<f64>,
    /// Whether the sender was on the whitelist.
    #[serde(default)]
    pub whitelisted: bool,
    /// Whether the sender was on the blacklist.
    #[serde(default)]
    pub blacklisted: bool,
}

/// Aggregate scan statistics derived from locally cached results.
///
/// Field names match what the options page expects on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    /// Number of cached analyses.
    pub total_scans: usize,
    /// Analyses that came back high or critical.
    pub threats_blocked: usize,
    /// Mean risk score across cached analyses.
    pub avg_risk_score: f64,
    /// Timestamp of the most recent analysis, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<DateTime<Utc>>,
}
