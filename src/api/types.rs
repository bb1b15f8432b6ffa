//! Type definitions for the portfolio backend API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Backend API error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("chart payload is not valid base64: {0}")]
    ChartPayload(#[from] base64::DecodeError),
}

/// Reporting period accepted by the income and chart endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
    AllTime,
}

impl Period {
    pub fn all() -> [Period; 5] {
        [
            Period::Day,
            Period::Week,
            Period::Month,
            Period::Year,
            Period::AllTime,
        ]
    }

    /// Wire value used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::AllTime => "all_time",
        }
    }

    /// Russian label shown in the UI
    pub fn label(&self) -> &'static str {
        match self {
            Period::Day => "день",
            Period::Week => "неделю",
            Period::Month => "месяц",
            Period::Year => "год",
            Period::AllTime => "все время",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "all_time" | "all-time" => Ok(Period::AllTime),
            other => Err(format!(
                "unknown period '{}', expected day|week|month|year|all-time",
                other
            )),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backend-rendered chart to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Capital,
    Income,
}

impl ChartKind {
    /// Path segment under /api/chart/
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Capital => "capital",
            ChartKind::Income => "income",
        }
    }
}

/// Brokerage account as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID
    pub id: String,

    /// Human-readable account name
    pub name: String,

    /// Account type (broker, IIS, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Aggregate value of the account
    #[serde(default, with = "rust_decimal::serde::float")]
    pub portfolio_value: Decimal,
}

/// Single position within the aggregated portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Instrument name
    pub name: String,

    /// Current market value of the position
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,

    /// Accumulated yield of the position
    #[serde(rename = "yield", with = "rust_decimal::serde::float")]
    pub yield_value: Decimal,
}

/// Aggregated portfolio snapshot across the selected accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Total portfolio value
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,

    /// Stock positions
    #[serde(default)]
    pub stocks: Vec<Position>,

    /// Bond positions
    #[serde(default)]
    pub bonds: Vec<Position>,

    /// ETF positions
    #[serde(default)]
    pub etfs: Vec<Position>,

    /// All positions, as aggregated by the backend
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// Income breakdown for a reporting period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeReport {
    /// Total income over the period
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,

    /// Income from bond coupons
    #[serde(with = "rust_decimal::serde::float")]
    pub bond_income: Decimal,

    /// Income from dividends
    #[serde(with = "rust_decimal::serde::float")]
    pub dividend_income: Decimal,

    /// Broker commission paid over the period
    #[serde(with = "rust_decimal::serde::float")]
    pub commission_expenses: Decimal,
}

impl IncomeReport {
    /// Net income after commissions. Derived locally, never fetched.
    pub fn net_income(&self) -> Decimal {
        self.total_income - self.commission_expenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_period_round_trip() {
        for period in Period::all() {
            let parsed: Period = period.as_str().parse().unwrap();
            assert_eq!(parsed, period);
        }
        assert_eq!("all-time".parse::<Period>().unwrap(), Period::AllTime);
        assert!("quarter".parse::<Period>().is_err());
    }

    #[test]
    fn test_net_income_matches_input_precision() {
        let report = IncomeReport {
            total_income: dec!(1234.56),
            bond_income: dec!(200.00),
            dividend_income: dec!(1034.56),
            commission_expenses: dec!(34.06),
        };
        assert_eq!(report.net_income(), dec!(1200.50));
    }

    #[test]
    fn test_position_yield_field_name() {
        let json = r#"{"name": "X", "value": 1000.0, "yield": 50.0}"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.name, "X");
        assert_eq!(position.value, dec!(1000));
        assert_eq!(position.yield_value, dec!(50));
    }
}
