//! Breach and password checks exposed on [`BreachCheck`].

use crate::models::{AccountReport, BreachSummary, DataClassCount, NotifyReceipt, SiteStats};
use crate::password::ExposureResult;
use crate::{BreachCheck, Result};
use serde_json::Value;

impl BreachCheck {
    /// Check whether a password appears in known breach corpora.
    ///
    /// The first-party endpoint is tried once; on any failure the prefix-range
    /// service is tried once.
    pub async fn check_password(&self, password: &str) -> Result<ExposureResult> {
        self.passwords.check_password(password).await
    }

    pub async fn check_account(&self, account: &str) -> Result<AccountReport> {
        self.api.check_account(account).await
    }

    pub async fn list_breaches(&self) -> Result<Vec<BreachSummary>> {
        self.api.list_breaches().await
    }

    pub async fn get_breach(&self, id: &str) -> Result<BreachSummary> {
        self.api.get_breach(id).await
    }

    pub async fn stats(&self) -> Result<SiteStats> {
        self.api.stats().await
    }

    pub async fn top_data_classes(&self) -> Result<Vec<DataClassCount>> {
        self.api.top_data_classes().await
    }

    pub async fn notify(&self, target: &str, contact: Option<&str>) -> Result<NotifyReceipt> {
        self.api.notify(target, contact).await
    }

    pub async fn service_status(&self) -> Result<Value> {
        self.api.service_status().await
    }

    pub async fn sources(&self) -> Result<Value> {
        self.api.sources().await
    }
}
