//! Client for the first-party breach API.

use crate::config::{ApiConfig, ClientConfig};
use crate::models::{
    AccountReport, BreachSummary, DataClassCount, NotifyReceipt, NotifyRequest, SiteStats,
};
use crate::network::{api_error, read_body, HttpClient};
use crate::password::{PrimaryCheck, PrimaryResponse};
use crate::{BreachError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Typed access to every first-party endpoint.
///
/// Non-2xx replies surface as [`BreachError::Api`] carrying the server's
/// `detail` or `error` message.
#[derive(Clone)]
pub struct BreachApi {
    http: Arc<HttpClient>,
    config: ClientConfig,
}

impl BreachApi {
    pub fn new(http: Arc<HttpClient>, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Look up an email address or username across all configured sources.
    pub async fn check_account(&self, account: &str) -> Result<AccountReport> {
        let account = account.trim();
        if account.is_empty() {
            return Err(BreachError::invalid_input("account", "must not be empty"));
        }
        debug!("Checking account");
        self.http
            .post_json(
                &self.config.api_url(ApiConfig::CHECK_ACCOUNT),
                &json!({ "account": account }),
            )
            .await
    }

    /// Full breach catalog.
    pub async fn list_breaches(&self) -> Result<Vec<BreachSummary>> {
        self.http
            .get_json(&self.config.api_url(ApiConfig::BREACHES))
            .await
    }

    /// One breach by catalog name.
    pub async fn get_breach(&self, id: &str) -> Result<BreachSummary> {
        let id = id.trim();
        if id.is_empty() {
            return Err(BreachError::invalid_input("breach", "must not be empty"));
        }
        let path = format!("{}/{}", ApiConfig::BREACH, urlencoding::encode(id));
        self.http.get_json(&self.config.api_url(&path)).await
    }

    pub async fn stats(&self) -> Result<SiteStats> {
        self.http
            .get_json(&self.config.api_url(ApiConfig::STATS))
            .await
    }

    /// Most frequently leaked data classes, most common first.
    pub async fn top_data_classes(&self) -> Result<Vec<DataClassCount>> {
        let mut classes: Vec<DataClassCount> = self
            .http
            .get_json(&self.config.api_url(ApiConfig::TOP_DATA_CLASSES))
            .await?;
        classes.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(classes)
    }

    /// Subscribe `contact` to notifications about `target`.
    ///
    /// A 2xx reply whose body is not a receipt still counts as accepted.
    pub async fn notify(&self, target: &str, contact: Option<&str>) -> Result<NotifyReceipt> {
        let target = target.trim();
        if target.is_empty() {
            return Err(BreachError::invalid_input("target", "must not be empty"));
        }
        let request = NotifyRequest {
            target: target.to_string(),
            contact: contact.map(str::trim).unwrap_or_default().to_string(),
        };

        let url = self.config.api_url(ApiConfig::NOTIFY);
        let response = self.http.post_json_raw(&url, &request).await?;
        let status = response.status();
        let body = read_body(response, &url).await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        match serde_json::from_str::<NotifyReceipt>(&body) {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                warn!("Notify accepted with unreadable body: {}", e);
                Ok(NotifyReceipt::accepted())
            }
        }
    }

    /// Backend health and per-source availability, as reported.
    pub async fn service_status(&self) -> Result<Value> {
        self.http
            .get_json(&self.config.api_url(ApiConfig::STATUS))
            .await
    }

    /// Upstream sources the backend queries.
    pub async fn sources(&self) -> Result<Value> {
        self.http
            .get_json(&self.config.api_url(ApiConfig::SOURCES))
            .await
    }
}

#[async_trait]
impl PrimaryCheck for BreachApi {
    async fn check(&self, password: &str) -> Result<PrimaryResponse> {
        self.http
            .post_json(
                &self.config.api_url(ApiConfig::CHECK_PASSWORD),
                &json!({ "password": password }),
            )
            .await
    }
}
