//! HTTP client shared by the API client, the password checker and the
//! offline cache.
//!
//! Provides a wrapper around reqwest with:
//! - Configurable timeouts
//! - User-agent management
//! - `no-cache` GETs so the remote API is never answered by an intermediary
//! - Uniform mapping of non-2xx responses to [`BreachError::Api`]

use crate::config::{AppConfig, ClientConfig};
use crate::{BreachError, Result};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// HTTP client with uniform error mapping.
pub struct HttpClient {
    client: Client,
    /// Default timeout for requests.
    default_timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_timeout(ClientConfig::default().timeout)
    }

    /// Create a new HTTP client with a custom default timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(AppConfig::USER_AGENT)
            .build()
            .map_err(|e| BreachError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Get a reference to the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// The timeout every request is built with.
    pub fn timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Make a GET request. Only transport failures are errors; the caller
    /// inspects the status.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| BreachError::Network {
                message: format!("GET {} failed: {}", redact(url), e),
                cause: std::error::Error::source(&e).map(|s| s.to_string()),
            })
    }

    /// GET a plain-text body, failing on non-2xx.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        let status = response.status();
        let body = read_body(response, url).await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(body)
    }

    /// GET and decode a JSON body, failing on non-2xx.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url).await?;
        decode_json(response, url).await
    }

    /// Make a POST request with JSON body and decode the JSON reply.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.post_json_raw(url, body).await?;
        decode_json(response, url).await
    }

    /// Make a POST request with JSON body, returning the raw response.
    pub async fn post_json_raw<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Response> {
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BreachError::Network {
                message: format!("POST {} failed: {}", redact(url), e),
                cause: std::error::Error::source(&e).map(|s| s.to_string()),
            })
    }
}

/// Shared HTTP client instance.
#[derive(Clone)]
pub struct SharedHttpClient(Arc<HttpClient>);

impl SharedHttpClient {
    /// Create a new shared HTTP client from runtime settings.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self(Arc::new(HttpClient::with_timeout(config.timeout)?)))
    }

    /// Get a clone of the Arc for sharing.
    pub fn clone_inner(&self) -> Arc<HttpClient> {
        self.0.clone()
    }
}

impl std::ops::Deref for SharedHttpClient {
    type Target = HttpClient;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub(crate) async fn read_body(response: Response, url: &str) -> Result<String> {
    response.text().await.map_err(|e| BreachError::Network {
        message: format!("Reading body of {} failed: {}", redact(url), e),
        cause: None,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
    let status = response.status();
    let body = read_body(response, url).await?;
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| {
        debug!("Undecodable JSON from {}: {}", redact(url), e);
        BreachError::malformed(format!("unexpected JSON from {}: {}", redact(url), e))
    })
}

/// Build the error for a non-2xx reply.
///
/// Message preference: JSON `detail`, JSON `error`, raw body, `HTTP <code>`.
pub fn api_error(status: StatusCode, body: &str) -> BreachError {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["detail", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        });

    let message = match from_json {
        Some(m) if !m.trim().is_empty() => m,
        _ if !body.trim().is_empty() && !body.trim_start().starts_with('{') => {
            body.trim().to_string()
        }
        _ => format!("HTTP {}", status.as_u16()),
    };

    BreachError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Strip the query string so account names never reach the logs.
pub fn redact(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut u) => {
            u.set_query(None);
            u.to_string()
        }
        Err(_) => url.split('?').next().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: BreachError) -> (u16, String) {
        match err {
            BreachError::Api { status, message } => (status, message),
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_api_error_prefers_detail() {
        let err = api_error(
            StatusCode::NOT_FOUND,
            r#"{"detail":"Breach not found","error":"ignored"}"#,
        );
        assert_eq!(message(err), (404, "Breach not found".to_string()));
    }

    #[test]
    fn test_api_error_falls_back_to_error_field() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Account tidak boleh kosong"}"#,
        );
        assert_eq!(message(err).1, "Account tidak boleh kosong");
    }

    #[test]
    fn test_api_error_uses_plain_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(message(err).1, "upstream down");
    }

    #[test]
    fn test_api_error_default_message() {
        assert_eq!(
            message(api_error(StatusCode::INTERNAL_SERVER_ERROR, "")).1,
            "HTTP 500"
        );
        assert_eq!(
            message(api_error(StatusCode::INTERNAL_SERVER_ERROR, "{}")).1,
            "HTTP 500"
        );
    }

    #[test]
    fn test_redact_drops_query() {
        assert_eq!(
            redact("https://example.com/api/account?acct=me@example.com"),
            "https://example.com/api/account"
        );
        assert_eq!(redact("not a url?secret=1"), "not a url");
    }

    #[tokio::test]
    async fn test_client_with_timeout() {
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }
}
