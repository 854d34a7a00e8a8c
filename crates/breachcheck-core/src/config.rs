//! Centralized configuration for BreachCheck.
//!
//! Compile-time defaults live on unit structs; [`ClientConfig`] carries the
//! values a front end may override at runtime.

use crate::error::{BreachError, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "BreachCheck";
    pub const USER_AGENT: &'static str = "BreachCheck/1.0";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_API_BASE: &'static str = "http://127.0.0.1:5000";
    pub const DEFAULT_RANGE_BASE: &'static str = "https://api.pwnedpasswords.com";
}

/// First-party API routes.
pub struct ApiConfig;

impl ApiConfig {
    pub const CHECK_ACCOUNT: &'static str = "/api/check-account";
    pub const CHECK_PASSWORD: &'static str = "/api/check-password";
    pub const BREACHES: &'static str = "/api/breaches";
    pub const BREACH: &'static str = "/api/breach";
    pub const STATS: &'static str = "/api/stats";
    pub const TOP_DATA_CLASSES: &'static str = "/api/top-dataclasses";
    pub const NOTIFY: &'static str = "/api/notify";
    pub const STATUS: &'static str = "/api/status";
    pub const SOURCES: &'static str = "/api/sources";
    pub const RANGE: &'static str = "/range";
}

/// Offline asset bundle defaults.
pub struct OfflineConfig;

impl OfflineConfig {
    pub const CACHE_VERSION: &'static str = "bc-v2";
    pub const DB_FILE_NAME: &'static str = "offline.db";
    pub const CACHE_DIR_NAME: &'static str = "breachcheck";

    /// Application shell and static assets, in install order.
    pub const ASSETS: &'static [&'static str] = &[
        "index.html",
        "breaches.html",
        "breach.html",
        "stats.html",
        "assets/css/style.css",
        "assets/js/api.js",
        "assets/js/ui.js",
        "assets/js/hash.js",
        "assets/js/theme.js",
        "assets/js/i18n.js",
        "assets/js/main.js",
        "assets/js/breaches.js",
        "assets/js/breach.js",
        "assets/js/stats.js",
        "assets/img/logo.svg",
        "assets/img/hero.svg",
        "manifest.webmanifest",
    ];

    /// Default location of the persistent generation store.
    pub fn default_db_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(Self::CACHE_DIR_NAME)
            .join(Self::DB_FILE_NAME)
    }
}

/// Runtime client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the first-party breach API.
    pub api_base: Url,
    /// Base URL of the prefix-range password service.
    pub range_base: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(NetworkConfig::DEFAULT_API_BASE)
                .expect("default API base is a valid URL"),
            range_base: Url::parse(NetworkConfig::DEFAULT_RANGE_BASE)
                .expect("default range base is a valid URL"),
            timeout: NetworkConfig::REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first-party API base URL.
    pub fn with_api_base(mut self, base: &str) -> Result<Self> {
        self.api_base = parse_base(base)?;
        Ok(self)
    }

    /// Set the range service base URL.
    pub fn with_range_base(mut self, base: &str) -> Result<Self> {
        self.range_base = parse_base(base)?;
        Ok(self)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for a first-party API path.
    pub fn api_url(&self, path: &str) -> String {
        join(&self.api_base, path)
    }

    /// Absolute URL for a range prefix.
    pub fn range_url(&self, prefix: &str) -> String {
        join(&self.range_base, &format!("{}/{}", ApiConfig::RANGE, prefix))
    }
}

fn parse_base(base: &str) -> Result<Url> {
    let url = Url::parse(base).map_err(|e| BreachError::Config {
        message: format!("Invalid base URL '{}': {}", base, e),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BreachError::Config {
            message: format!("Unsupported scheme for base URL '{}'", base),
        });
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
