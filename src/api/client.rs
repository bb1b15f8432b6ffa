//! Portfolio backend client implementation

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::types::*;
use super::Backend;

/// Default request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the portfolio backend
pub struct PortfolioApiClient {
    /// HTTP client
    client: Client,

    /// Base URL of the backend, without trailing slash
    base_url: String,
}

#[derive(Deserialize)]
struct ValidResponse {
    valid: bool,
}

#[derive(Deserialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    accounts: Vec<Account>,
}

impl PortfolioApiClient {
    /// Create a new client for the given backend base URL
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: String) -> Result<Value, ApiError> {
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::json_body(response).await
    }

    async fn post_json(&self, url: String, body: Value) -> Result<Value, ApiError> {
        debug!("POST {}", url);
        let response = self.client.post(&url).json(&body).send().await?;
        Self::json_body(response).await
    }

    /// Read a response body, surfacing the backend's `error` field when set.
    ///
    /// The backend reports failures both as non-2xx statuses and as an
    /// `error` field inside otherwise well-formed JSON bodies; both collapse
    /// into [`ApiError::Backend`] so callers treat them uniformly.
    async fn json_body(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(value) = serde_json::from_str::<Value>(&text) {
                if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
                    return Err(ApiError::Backend(message.to_string()));
                }
            }
            return Err(ApiError::Status { status, body: text });
        }

        let value: Value = serde_json::from_str(&text)?;
        if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
            return Err(ApiError::Backend(message.to_string()));
        }

        Ok(value)
    }
}

#[async_trait]
impl Backend for PortfolioApiClient {
    async fn validate_token(&self, user_id: i64, token: &str) -> Result<bool, ApiError> {
        let url = format!("{}/api/set_token", self.base_url);
        let body = json!({ "user_id": user_id, "token": token });

        let value = self.post_json(url, body).await?;
        let response: ValidResponse = serde_json::from_value(value)?;

        debug!(user_id, valid = response.valid, "Token validation result");
        Ok(response.valid)
    }

    async fn accounts(&self, user_id: i64) -> Result<Vec<Account>, ApiError> {
        let url = format!("{}/api/accounts?user_id={}", self.base_url, user_id);

        let value = self.get_json(url).await?;
        let response: AccountsResponse = serde_json::from_value(value)?;

        debug!(user_id, count = response.accounts.len(), "Fetched accounts");
        Ok(response.accounts)
    }

    async fn save_accounts(&self, user_id: i64, account_ids: &[String]) -> Result<(), ApiError> {
        let url = format!("{}/api/set_accounts", self.base_url);
        let body = json!({ "user_id": user_id, "account_ids": account_ids });

        let value = self.post_json(url, body).await?;
        let response: SuccessResponse = serde_json::from_value(value)?;

        if !response.success {
            return Err(ApiError::Backend(
                "account selection was not saved".to_string(),
            ));
        }
        Ok(())
    }

    async fn portfolio(&self, user_id: i64) -> Result<PortfolioSummary, ApiError> {
        let url = format!("{}/api/portfolio?user_id={}", self.base_url, user_id);

        let value = self.get_json(url).await?;
        let summary: PortfolioSummary = serde_json::from_value(value)?;

        debug!(
            user_id,
            positions = summary.positions.len(),
            "Fetched portfolio"
        );
        Ok(summary)
    }

    async fn chart(
        &self,
        user_id: i64,
        kind: ChartKind,
        period: Period,
    ) -> Result<Vec<u8>, ApiError> {
        let url = format!(
            "{}/api/chart/{}?user_id={}&period={}",
            self.base_url,
            kind.as_str(),
            user_id,
            period
        );

        let value = self.get_json(url).await?;
        let encoded = value
            .get("chart")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ApiError::Backend("chart missing from response".to_string()))?;

        let bytes = general_purpose::STANDARD.decode(encoded)?;
        debug!(user_id, kind = kind.as_str(), bytes = bytes.len(), "Fetched chart");
        Ok(bytes)
    }

    async fn income(&self, user_id: i64, period: Period) -> Result<IncomeReport, ApiError> {
        let url = format!(
            "{}/api/income?user_id={}&period={}",
            self.base_url, user_id, period
        );

        let value = self.get_json(url).await?;
        let report: IncomeReport = serde_json::from_value(value)?;
        Ok(report)
    }
}
