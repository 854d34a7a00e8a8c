//! BreachCheck Core - client library for breach lookups, password exposure
//! checks and offline caching of the web application shell.
//!
//! This crate can be used programmatically without the CLI. The
//! `breachcheck` binary in `breachcheck-cli` is a thin layer over it.
//!
//! # Example
//!
//! ```rust,ignore
//! use breachcheck_core::BreachCheck;
//!
//! #[tokio::main]
//! async fn main() -> breachcheck_core::Result<()> {
//!     let client = BreachCheck::builder()
//!         .api_base("https://breachcheck.example")?
//!         .build()?;
//!
//!     let exposure = client.check_password("hunter2").await?;
//!     if exposure.pwned {
//!         println!("Seen {:?} times", exposure.occurrence_count);
//!     }
//!
//!     let report = client.check_account("me@example.com").await?;
//!     println!("Account found in breaches: {}", report.found);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod network;
pub mod offline;
pub mod password;

mod api;

// Re-export commonly used types
pub use config::{ClientConfig, OfflineConfig};
pub use error::{BreachError, Result};
pub use models::{AccountReport, BreachSummary, DataClassCount, NotifyReceipt, SiteStats};
pub use network::{Fetcher, HttpClient, OriginFetcher, SharedHttpClient};
pub use offline::{
    CacheGeneration, CachedAsset, GenerationStore, Intercept, MemoryStore, OfflineCache,
    Served, ServedFrom, SqliteStore,
};
pub use password::{ExposureResult, ExposureSource, Fingerprint, PasswordChecker};

pub use api::{BreachApi, BreachCheckBuilder};

use std::sync::Arc;

/// Main entry point for BreachCheck operations.
///
/// Owns one shared HTTP client used for the first-party API, the
/// prefix-range fallback and any offline cache created from it.
pub struct BreachCheck {
    config: ClientConfig,
    http: SharedHttpClient,
    api: Arc<BreachApi>,
    passwords: PasswordChecker,
}

impl BreachCheck {
    /// Create a builder for BreachCheck.
    pub fn builder() -> BreachCheckBuilder {
        BreachCheckBuilder::new()
    }

    /// Create an instance from a ready-made configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        BreachCheckBuilder::new().config(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Direct access to the first-party API client.
    pub fn api(&self) -> &BreachApi {
        &self.api
    }

    pub fn http(&self) -> &SharedHttpClient {
        &self.http
    }
}
