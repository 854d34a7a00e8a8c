//! Account lookup results.

use super::breach::BreachSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of checking an email address or username.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountReport {
    /// Older backends call this `pwned`.
    #[serde(alias = "pwned")]
    pub found: bool,
    #[serde(default)]
    pub breaches: Vec<AccountBreach>,
    /// Per-source verdicts, keyed by source name.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceVerdict>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl AccountReport {
    /// Sources that reported a hit, in name order.
    pub fn hit_sources(&self) -> impl Iterator<Item = (&str, &SourceVerdict)> {
        self.sources
            .iter()
            .filter(|(_, v)| v.is_hit())
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// One breach entry of an [`AccountReport`].
///
/// Aggregating backends tag each hit with its source; catalog backends list
/// plain breach entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountBreach {
    Sourced {
        source: String,
        #[serde(default)]
        data: serde_json::Value,
    },
    Catalog(BreachSummary),
}

/// What one upstream source said about the account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceVerdict {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SourceVerdict {
    pub fn is_hit(&self) -> bool {
        self.found.unwrap_or(false) || self.pwned.unwrap_or(false)
    }

    /// A source that answered without error and without a hit.
    pub fn is_clean(&self) -> bool {
        !self.is_hit() && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregated_report() {
        let json = r#"{
            "found": true,
            "breaches": [{"source": "hibp", "data": {"total": 2}}],
            "sources": {
                "hibp": {"found": true, "total": 2, "message": "Found 2 breaches in HIBP"},
                "dehashed": {"error": "DeHashed rate limit exceeded", "status": "rate_limited"},
                "local_db": {"found": false}
            },
            "summary": {"found": true},
            "timestamp": "2024-05-01T10:00:00"
        }"#;
        let report: AccountReport = serde_json::from_str(json).unwrap();
        assert!(report.found);
        assert!(matches!(
            &report.breaches[0],
            AccountBreach::Sourced { source, .. } if source == "hibp"
        ));

        let hits: Vec<&str> = report.hit_sources().map(|(name, _)| name).collect();
        assert_eq!(hits, vec!["hibp"]);
        assert!(report.sources["local_db"].is_clean());
        assert!(!report.sources["dehashed"].is_clean());
    }

    #[test]
    fn test_legacy_report() {
        let json = r#"{
            "pwned": true,
            "breaches": [{"Name": "Adobe", "BreachDate": "2013-10-04", "IsVerified": true}]
        }"#;
        let report: AccountReport = serde_json::from_str(json).unwrap();
        assert!(report.found);
        match &report.breaches[0] {
            AccountBreach::Catalog(b) => assert_eq!(b.name, "Adobe"),
            other => panic!("expected catalog entry, got {:?}", other),
        }
    }
}
