//! HTTP client layer for the portfolio backend
//!
//! The backend owns token validation, portfolio aggregation and chart
//! rasterization; this layer only shapes requests and decodes responses.

pub mod client;
pub mod types;

pub use client::PortfolioApiClient;
pub use types::{
    Account, ApiError, ChartKind, IncomeReport, Period, PortfolioSummary, Position,
};

use async_trait::async_trait;

/// Backend operations the screens depend on.
///
/// The TUI and the setup resolver talk to the backend through this trait so
/// their logic can be exercised against an in-memory fake in tests.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Submit the token for validation. Returns the backend's verdict.
    async fn validate_token(&self, user_id: i64, token: &str) -> Result<bool, ApiError>;

    /// Fetch every account known to the backend for this user.
    async fn accounts(&self, user_id: i64) -> Result<Vec<Account>, ApiError>;

    /// Persist the account selection on the backend.
    async fn save_accounts(&self, user_id: i64, account_ids: &[String]) -> Result<(), ApiError>;

    /// Fetch the aggregated portfolio snapshot.
    async fn portfolio(&self, user_id: i64) -> Result<PortfolioSummary, ApiError>;

    /// Fetch a backend-rendered chart as decoded PNG bytes.
    async fn chart(
        &self,
        user_id: i64,
        kind: ChartKind,
        period: Period,
    ) -> Result<Vec<u8>, ApiError>;

    /// Fetch the income breakdown for a period.
    async fn income(&self, user_id: i64, period: Period) -> Result<IncomeReport, ApiError>;
}
