//! Network seam for the offline cache.
//!
//! The cache controller never talks to reqwest directly; it asks a
//! [`Fetcher`] for a resource key. [`OriginFetcher`] resolves keys against a
//! site origin, tests substitute their own implementations.

use crate::network::client::{redact, HttpClient};
use crate::offline::CachedAsset;
use crate::{BreachError, Result};
use async_trait::async_trait;
use reqwest::header;
use std::sync::Arc;
use url::Url;

/// Fetches a single resource by its cache key.
///
/// Only transport failures are errors. A non-2xx reply is returned as a
/// [`CachedAsset`] with that status so the caller can decide what to do.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<CachedAsset>;
}

/// Shared fetcher handle.
pub type DynFetcher = Arc<dyn Fetcher>;

/// Fetches resources relative to a site origin.
pub struct OriginFetcher {
    http: Arc<HttpClient>,
    origin: Url,
}

impl OriginFetcher {
    pub fn new(http: Arc<HttpClient>, origin: &str) -> Result<Self> {
        let mut origin = Url::parse(origin).map_err(|e| BreachError::Config {
            message: format!("Invalid origin '{}': {}", origin, e),
        })?;
        if !origin.path().ends_with('/') {
            let path = format!("{}/", origin.path());
            origin.set_path(&path);
        }
        Ok(Self { http, origin })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Absolute URL for a cache key.
    pub fn url_for(&self, key: &str) -> Result<Url> {
        resolve_under(&self.origin, key)
    }
}

/// Resolve a relative resource path against `origin`.
///
/// The result must keep the origin's scheme, host and port and stay under its
/// path. Absolute URLs, scheme-relative forms and `..` escapes are rejected
/// with [`BreachError::InvalidInput`].
pub fn resolve_under(origin: &Url, key: &str) -> Result<Url> {
    let url = origin
        .join(key)
        .map_err(|e| BreachError::invalid_input("path", format!("cannot resolve '{}': {}", key, e)))?;
    if url.origin() != origin.origin() || !url.path().starts_with(origin.path()) {
        return Err(BreachError::invalid_input(
            "path",
            format!("'{}' is outside {}", key, origin),
        ));
    }
    Ok(url)
}

#[async_trait]
impl Fetcher for OriginFetcher {
    async fn fetch(&self, key: &str) -> Result<CachedAsset> {
        let url = self.url_for(key)?;
        let response = self.http.get(url.as_str()).await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| BreachError::Network {
            message: format!("Reading body of {} failed: {}", redact(url.as_str()), e),
            cause: None,
        })?;

        Ok(CachedAsset::new(key, status, content_type, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::normalize_key;

    fn fetcher(origin: &str) -> OriginFetcher {
        OriginFetcher::new(Arc::new(HttpClient::new().unwrap()), origin).unwrap()
    }

    #[tokio::test]
    async fn test_url_for_relative_keys() {
        let f = fetcher("https://example.com");
        assert_eq!(
            f.url_for("assets/js/api.js").unwrap().as_str(),
            "https://example.com/assets/js/api.js"
        );
    }

    #[tokio::test]
    async fn test_origin_with_subpath_keeps_prefix() {
        let f = fetcher("https://example.com/app");
        assert_eq!(f.origin().as_str(), "https://example.com/app/");
        assert_eq!(
            f.url_for("breach.html?id=Adobe").unwrap().as_str(),
            "https://example.com/app/breach.html?id=Adobe"
        );
    }

    #[tokio::test]
    async fn test_keys_cannot_leave_origin() {
        let f = fetcher("http://127.0.0.1:5000/app");
        for path in [
            "/http://169.254.169.254/latest/meta-data",
            "/file:///etc/passwd",
            "/\\\\evil.example/x",
            "/../admin",
        ] {
            let err = f.url_for(&normalize_key(path)).unwrap_err();
            assert!(
                matches!(err, BreachError::InvalidInput { .. }),
                "{} resolved: {}",
                path,
                err
            );
        }
        assert_eq!(
            f.url_for(&normalize_key("//assets/js/ui.js")).unwrap().as_str(),
            "http://127.0.0.1:5000/app/assets/js/ui.js"
        );
    }

    #[tokio::test]
    async fn test_invalid_origin() {
        let http = Arc::new(HttpClient::new().unwrap());
        assert!(OriginFetcher::new(http, "::nope").is_err());
    }
}
