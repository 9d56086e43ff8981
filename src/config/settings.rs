//! User-facing extension settings.
//!
//! Settings are persisted as flat camelCase keys in the synchronized
//! storage area. Reads always return the full default set merged under any
//! persisted overrides; a partial persisted map is never surfaced as-is.

use serde::{Deserialize, Serialize};

use crate::domain::RiskLevel;

/// Default base URL of the analysis service.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// The complete settings map. Every read is total over this key set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Base URL of the analysis service.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Automatically analyze newly opened emails.
    #[serde(default = "default_true")]
    pub auto_scan: bool,
    /// Show a system notification for high-risk results.
    #[serde(default = "default_true")]
    pub show_notifications: bool,
    /// Minimum risk level the UI treats as actionable.
    #[serde(default = "default_risk_threshold")]
    pub risk_threshold: RiskLevel,
    /// Block navigation to links flagged as suspicious.
    #[serde(default)]
    pub block_suspicious_links: bool,
    /// Verbose diagnostic logging in UI contexts.
    #[serde(default)]
    pub debug_mode: bool,
    /// Allow anonymous usage analytics.
    #[serde(default = "default_true")]
    pub analytics: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_risk_threshold() -> RiskLevel {
    RiskLevel::Medium
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auto_scan: true,
            show_notifications: true,
            risk_threshold: RiskLevel::Medium,
            block_suspicious_links: false,
            debug_mode: false,
            analytics: true,
        }
    }
}

impl Settings {
    /// Builds settings from a persisted key/value map, falling back to the
    /// default for every absent key. Unknown keys are ignored.
    pub fn from_persisted(map: serde_json::Map<String, serde_json::Value>) -> serde_json::Result<Self> {
        serde_json::from_value(serde_json::Value::Object(map))
    }
}

/// A partial settings update. Only the present fields are written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scan: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_threshold: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_suspicious_links: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<bool>,
}

impl SettingsPatch {
    /// The patch as flat wire key/value pairs, one per present field.
    pub fn entries(&self) -> Vec<(String, serde_json::Value)> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_set() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, "http://localhost:8000");
        assert!(settings.auto_scan);
        assert!(settings.show_notifications);
        assert_eq!(settings.risk_threshold, RiskLevel::Medium);
        assert!(!settings.block_suspicious_links);
        assert!(!settings.debug_mode);
        assert!(settings.analytics);
    }

    #[test]
    fn empty_persisted_map_yields_defaults() {
        let settings = Settings::from_persisted(serde_json::Map::new()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_persisted_map_merges_under_defaults() {
        let mut map = serde_json::Map::new();
        map.insert("riskThreshold".to_string(), json!("high"));
        map.insert("autoScan".to_string(), json!(false));
        // keys other code may have left in the same area are ignored
        map.insert("somethingElse".to_string(), json!(1));

        let settings = Settings::from_persisted(map).unwrap();
        assert_eq!(settings.risk_threshold, RiskLevel::High);
        assert!(!settings.auto_scan);
        // all remaining keys stay at their defaults
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert!(settings.show_notifications);
        assert!(settings.analytics);
    }

    #[test]
    fn settings_serialize_to_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "apiUrl",
            "autoScan",
            "showNotifications",
            "riskThreshold",
            "blockSuspiciousLinks",
            "debugMode",
            "analytics",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj.len(), 7);
    }

    #[test]
    fn patch_entries_only_contain_present_fields() {
        let patch = SettingsPatch {
            risk_threshold: Some(RiskLevel::High),
            debug_mode: Some(true),
            ..Default::default()
        };

        let mut entries = patch.entries();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            entries,
            vec![
                ("debugMode".to_string(), json!(true)),
                ("riskThreshold".to_string(), json!("high")),
            ]
        );
    }

    #[test]
    fn empty_patch_has_no_entries() {
        assert!(SettingsPatch::default().entries().is_empty());
    }
}
