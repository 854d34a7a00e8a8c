//! Password exposure check: first-party endpoint, then k-anonymity fallback.

use super::fingerprint::Fingerprint;
use super::range::{scan_range, RangeLookup};
use crate::{BreachError, Result};
use async_trait::async_trait;
use futures::TryFutureExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which path produced an [`ExposureResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureSource {
    Primary,
    RangeFallback,
}

/// Outcome of one password check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureResult {
    pub pwned: bool,
    /// Times the password was seen; present only when `pwned`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_count: Option<u64>,
    pub source: ExposureSource,
}

impl ExposureResult {
    pub fn clean(source: ExposureSource) -> Self {
        Self {
            pwned: false,
            occurrence_count: None,
            source,
        }
    }

    pub fn pwned(count: u64, source: ExposureSource) -> Self {
        Self {
            pwned: true,
            occurrence_count: Some(count),
            source,
        }
    }
}

/// Wire shape of the first-party check endpoint.
///
/// Older backends answer `found` instead of `pwned`; both map onto the same
/// field here.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryResponse {
    #[serde(alias = "found")]
    pub pwned: bool,
    #[serde(default)]
    pub count: Option<u64>,
}

impl TryFrom<PrimaryResponse> for ExposureResult {
    type Error = BreachError;

    fn try_from(response: PrimaryResponse) -> Result<Self> {
        match (response.pwned, response.count) {
            (true, Some(count)) => Ok(ExposureResult::pwned(count, ExposureSource::Primary)),
            (true, None) => Err(BreachError::malformed(
                "password check reported a hit without a count",
            )),
            (false, _) => Ok(ExposureResult::clean(ExposureSource::Primary)),
        }
    }
}

/// First-party endpoint that checks a raw password server-side.
#[async_trait]
pub trait PrimaryCheck: Send + Sync {
    async fn check(&self, password: &str) -> Result<PrimaryResponse>;
}

/// Checks passwords against the primary endpoint, falling back to a
/// prefix-range lookup when the primary path fails to answer (transport error,
/// non-success status or malformed body).
pub struct PasswordChecker {
    primary: Arc<dyn PrimaryCheck>,
    range: Arc<dyn RangeLookup>,
}

impl PasswordChecker {
    pub fn new(primary: Arc<dyn PrimaryCheck>, range: Arc<dyn RangeLookup>) -> Self {
        Self { primary, range }
    }

    /// Check one password. Each path is tried at most once.
    ///
    /// # Errors
    ///
    /// - [`BreachError::InvalidInput`] for an empty password (no request made)
    /// - [`BreachError::ResourceUnavailable`] when both paths fail to answer
    /// - [`BreachError::MalformedResponse`] when the range body is unparsable
    /// - any local primary failure (configuration, I/O) as-is, without fallback
    pub async fn check_password(&self, password: &str) -> Result<ExposureResult> {
        if password.is_empty() {
            return Err(BreachError::invalid_input("password", "must not be empty"));
        }
        let fingerprint = &Fingerprint::of(password);

        self.attempt_primary(password)
            .or_else(|e| async move {
                if !e.is_transport() {
                    return Err(e);
                }
                warn!("Primary password check failed, using range lookup: {}", e);
                self.attempt_fallback(fingerprint).await
            })
            .await
    }

    async fn attempt_primary(&self, password: &str) -> Result<ExposureResult> {
        let response = self.primary.check(password).await?;
        ExposureResult::try_from(response)
    }

    async fn attempt_fallback(&self, fingerprint: &Fingerprint) -> Result<ExposureResult> {
        debug!("Range lookup for prefix {}", fingerprint.prefix());
        let body = self
            .range
            .range(fingerprint.prefix())
            .await
            .map_err(|e| BreachError::unavailable("Password exposure check", e))?;

        Ok(match scan_range(&body, fingerprint.suffix())? {
            Some(count) => ExposureResult::pwned(count, ExposureSource::RangeFallback),
            None => ExposureResult::clean(ExposureSource::RangeFallback),
        })
    }
}
