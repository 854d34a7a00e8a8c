//! Cached resources and the generation they belong to.

use crate::config::OfflineConfig;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored resource snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAsset {
    /// Normalized request key (see [`normalize_key`]).
    pub key: String,
    /// HTTP status the resource was fetched with.
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
    /// When the snapshot was taken.
    pub cached_at: DateTime<Utc>,
}

impl CachedAsset {
    pub fn new(
        key: &str,
        status: u16,
        content_type: Option<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            key: normalize_key(key),
            status,
            content_type,
            body: body.into(),
            cached_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn size_bytes(&self) -> u64 {
        self.body.len() as u64
    }
}

/// One version of the offline asset bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheGeneration {
    /// Monotonic identifier, also the store namespace.
    pub version: String,
    /// Resource keys, in install order.
    pub assets: Vec<String>,
}

impl CacheGeneration {
    pub fn new(version: impl Into<String>, assets: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            version: version.into(),
            assets: assets
                .into_iter()
                .map(|a| normalize_key(a.as_ref()))
                .collect(),
        }
    }

    /// The built-in application shell under a given version.
    pub fn shell(version: impl Into<String>) -> Self {
        Self::new(version, OfflineConfig::ASSETS.iter().copied())
    }
}

impl Default for CacheGeneration {
    fn default() -> Self {
        Self::shell(OfflineConfig::CACHE_VERSION)
    }
}

/// Normalize a request path (with optional query) into a cache key.
///
/// Leading slashes are dropped and the bare root maps to `index.html`, so
/// `/`, `index.html` and `/index.html` hit the same entry. Fragments are
/// never part of a key.
pub fn normalize_key(path: &str) -> String {
    let path = path.split('#').next().unwrap_or_default();
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('?') {
        format!("index.html{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("/"), "index.html");
        assert_eq!(normalize_key(""), "index.html");
        assert_eq!(normalize_key("/index.html"), "index.html");
        assert_eq!(normalize_key("//assets/js/ui.js"), "assets/js/ui.js");
        assert_eq!(normalize_key("/breach.html?id=Adobe#top"), "breach.html?id=Adobe");
        assert_eq!(normalize_key("/?lang=id"), "index.html?lang=id");
    }

    #[test]
    fn test_default_generation_is_shell() {
        let generation = CacheGeneration::default();
        assert_eq!(generation.version, "bc-v2");
        assert_eq!(generation.assets.len(), OfflineConfig::ASSETS.len());
        assert_eq!(generation.assets.last().unwrap(), "manifest.webmanifest");
    }

    #[test]
    fn test_success_range() {
        assert!(CachedAsset::new("a", 200, None, "x").is_success());
        assert!(CachedAsset::new("a", 204, None, "").is_success());
        assert!(!CachedAsset::new("a", 304, None, "").is_success());
        assert!(!CachedAsset::new("a", 404, None, "gone").is_success());
    }
}
