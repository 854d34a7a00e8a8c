//! Aggregate statistics and notification subscription types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Site-wide counters. Any field the backend omits stays `None`; keys this
/// type does not know are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    #[serde(default)]
    pub total_breaches: Option<u64>,
    #[serde(default)]
    pub total_accounts: Option<u64>,
    #[serde(default)]
    pub total_pwned_passwords: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// How often one kind of leaked data appears across breaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataClassCount {
    pub name: String,
    pub count: u64,
}

/// Subscription request for breach notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyRequest {
    /// Account or domain to watch.
    pub target: String,
    /// Where to send notifications; may be empty.
    pub contact: String,
}

/// Acknowledgement of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyReceipt {
    #[serde(default = "accepted", alias = "success")]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn accepted() -> bool {
    true
}

impl NotifyReceipt {
    /// Receipt for a 2xx reply without a readable body.
    pub fn accepted() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }
}
