//! Prefix-range lookups against a Pwned-Passwords style service.
//!
//! `GET {base}/range/{PREFIX}` answers with one `SUFFIX:COUNT` line per known
//! digest sharing the prefix. Only the prefix ever leaves the machine.

use super::fingerprint::PREFIX_LEN;
use crate::config::ClientConfig;
use crate::network::HttpClient;
use crate::{BreachError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Fetches the raw range body for a 5-character hex prefix.
#[async_trait]
pub trait RangeLookup: Send + Sync {
    async fn range(&self, prefix: &str) -> Result<String>;
}

/// HTTP implementation of [`RangeLookup`].
pub struct RangeClient {
    http: Arc<HttpClient>,
    config: ClientConfig,
}

impl RangeClient {
    pub fn new(http: Arc<HttpClient>, config: ClientConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl RangeLookup for RangeClient {
    async fn range(&self, prefix: &str) -> Result<String> {
        if prefix.len() != PREFIX_LEN || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BreachError::invalid_input(
                "prefix",
                format!("expected {} hex characters", PREFIX_LEN),
            ));
        }
        let prefix = prefix.to_ascii_uppercase();
        debug!("Querying password range for prefix {}", prefix);
        self.http.get_text(&self.config.range_url(&prefix)).await
    }
}

/// Find `suffix` in a range body and return its count.
///
/// Matching ignores ASCII case and tolerates CRLF line endings and blank
/// lines. Any other line that is not `HEX:COUNT` makes the whole body
/// malformed.
pub fn scan_range(body: &str, suffix: &str) -> Result<Option<u64>> {
    let mut found = None;

    for (index, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (candidate, count) = line.split_once(':').ok_or_else(|| {
            BreachError::malformed(format!("range line {} has no ':' separator", index + 1))
        })?;
        let count: u64 = count.trim().parse().map_err(|_| {
            BreachError::malformed(format!("range line {} has a non-numeric count", index + 1))
        })?;

        if found.is_none() && candidate.trim().eq_ignore_ascii_case(suffix) {
            found = Some(count);
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_returns_count() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:1\nABCDE12345:7\nFFFFF00000:2";
        assert_eq!(scan_range(body, "ABCDE12345").unwrap(), Some(7));
    }

    #[test]
    fn test_no_match() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:1\r\n00D4F6E8FA6EECAD2A3AA415EEC418D38EC:2\r\n";
        assert_eq!(scan_range(body, "ABCDE12345").unwrap(), None);
    }

    #[test]
    fn test_case_insensitive_and_crlf() {
        let body = "abcde12345:42\r\n";
        assert_eq!(scan_range(body, "ABCDE12345").unwrap(), Some(42));
    }

    #[test]
    fn test_prefix_of_longer_suffix_does_not_match() {
        let body = "ABCDE123456789:3";
        assert_eq!(scan_range(body, "ABCDE12345").unwrap(), None);
    }

    #[test]
    fn test_padding_entries_are_valid() {
        let body = "ABCDE12345:0\n";
        assert_eq!(scan_range(body, "ABCDE12345").unwrap(), Some(0));
    }

    #[test]
    fn test_empty_body_is_clean() {
        assert_eq!(scan_range("", "ABCDE12345").unwrap(), None);
    }

    #[test]
    fn test_malformed_lines() {
        let err = scan_range("<html>offline</html>", "ABCDE12345").unwrap_err();
        assert!(matches!(err, BreachError::MalformedResponse { .. }));

        let err = scan_range("ABCDE12345:seven", "ABCDE12345").unwrap_err();
        assert!(err.to_string().contains("non-numeric"));
    }

    #[tokio::test]
    async fn test_client_rejects_bad_prefix_without_request() {
        let client = RangeClient::new(Arc::new(HttpClient::new().unwrap()), ClientConfig::new());
        assert!(matches!(
            client.range("XYZ").await,
            Err(BreachError::InvalidInput { .. })
        ));
        assert!(matches!(
            client.range("GGGGG").await,
            Err(BreachError::InvalidInput { .. })
        ));
    }
}
