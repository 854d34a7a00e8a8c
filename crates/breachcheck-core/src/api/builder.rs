//! Builder for configuring BreachCheck initialization.

use std::sync::Arc;
use std::time::Duration;

use crate::api::BreachApi;
use crate::config::ClientConfig;
use crate::network::SharedHttpClient;
use crate::password::{PasswordChecker, PrimaryCheck, RangeClient, RangeLookup};
use crate::{BreachCheck, Result};

/// Builder for configuring BreachCheck initialization.
///
/// # Example
///
/// ```rust,ignore
/// use breachcheck_core::BreachCheck;
///
/// let client = BreachCheck::builder()
///     .api_base("https://breachcheck.example")?
///     .timeout(std::time::Duration::from_secs(5))
///     .build()?;
/// ```
pub struct BreachCheckBuilder {
    config: ClientConfig,
    primary: Option<Arc<dyn PrimaryCheck>>,
    range: Option<Arc<dyn RangeLookup>>,
}

impl BreachCheckBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            primary: None,
            range: None,
        }
    }

    /// Replace the whole client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Base URL of the first-party API.
    pub fn api_base(mut self, base: &str) -> Result<Self> {
        self.config = self.config.with_api_base(base)?;
        Ok(self)
    }

    /// Base URL of the prefix-range service.
    pub fn range_base(mut self, base: &str) -> Result<Self> {
        self.config = self.config.with_range_base(base)?;
        Ok(self)
    }

    /// Per-request timeout.
    ///
    /// Default: 10 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Use a custom first-party password check instead of the HTTP endpoint.
    pub fn with_primary(mut self, primary: Arc<dyn PrimaryCheck>) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Use a custom range lookup instead of the HTTP range service.
    pub fn with_range(mut self, range: Arc<dyn RangeLookup>) -> Self {
        self.range = Some(range);
        self
    }

    /// Build the BreachCheck instance.
    pub fn build(self) -> Result<BreachCheck> {
        let http = SharedHttpClient::new(&self.config)?;
        let api = Arc::new(BreachApi::new(http.clone_inner(), self.config.clone()));

        let primary: Arc<dyn PrimaryCheck> = match self.primary {
            Some(primary) => primary,
            None => api.clone(),
        };
        let range: Arc<dyn RangeLookup> = match self.range {
            Some(range) => range,
            None => Arc::new(RangeClient::new(http.clone_inner(), self.config.clone())),
        };

        tracing::debug!(
            "BreachCheck configured for {} (range service {})",
            self.config.api_base,
            self.config.range_base
        );

        Ok(BreachCheck {
            config: self.config,
            http,
            api,
            passwords: PasswordChecker::new(primary, range),
        })
    }
}

impl Default for BreachCheckBuilder {
    fn default() -> Self {
        Self::new()
    }
}
