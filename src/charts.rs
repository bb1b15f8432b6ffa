//! Backend-rendered chart handling
//!
//! Charts arrive as base64 PNG payloads. They are decoded, probed for
//! dimensions and cached under the data directory. Failures here are logged
//! and swallowed: a missing chart never blocks the rest of the dashboard.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

use crate::api::{Backend, ChartKind, Period};
use crate::data_paths::DataPaths;

/// Period charts are rendered for unless the user picks another one
pub const DEFAULT_CHART_PERIOD: Period = Period::Week;

/// A chart cached on disk
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub kind: ChartKind,
    pub width: u32,
    pub height: u32,
    pub path: PathBuf,
}

/// Fetch one chart; None on any failure.
///
/// The error is logged only — callers must not surface it to the user.
pub async fn fetch_chart(
    backend: &dyn Backend,
    data_paths: &DataPaths,
    user_id: i64,
    kind: ChartKind,
    period: Period,
) -> Option<ChartImage> {
    match try_fetch_chart(backend, data_paths, user_id, kind, period).await {
        Ok(chart) => Some(chart),
        Err(e) => {
            warn!(kind = kind.as_str(), "Chart load skipped: {:#}", e);
            None
        }
    }
}

async fn try_fetch_chart(
    backend: &dyn Backend,
    data_paths: &DataPaths,
    user_id: i64,
    kind: ChartKind,
    period: Period,
) -> Result<ChartImage> {
    let bytes = backend
        .chart(user_id, kind, period)
        .await
        .context("Chart request failed")?;

    let decoded =
        image::load_from_memory(&bytes).context("Chart payload is not a valid image")?;

    let charts_dir = data_paths.charts();
    fs::create_dir_all(&charts_dir)
        .await
        .context("Failed to create charts directory")?;

    let path = charts_dir.join(format!("{}_{}_{}.png", kind.as_str(), period, user_id));
    fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!(
        kind = kind.as_str(),
        width = decoded.width(),
        height = decoded.height(),
        "Chart cached"
    );

    Ok(ChartImage {
        kind,
        width: decoded.width(),
        height: decoded.height(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Account, ApiError, IncomeReport, PortfolioSummary};
    use async_trait::async_trait;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct ChartBackend {
        payload: Result<Vec<u8>, ()>,
    }

    #[async_trait]
    impl Backend for ChartBackend {
        async fn validate_token(&self, _user_id: i64, _token: &str) -> Result<bool, ApiError> {
            unimplemented!()
        }

        async fn accounts(&self, _user_id: i64) -> Result<Vec<Account>, ApiError> {
            unimplemented!()
        }

        async fn save_accounts(
            &self,
            _user_id: i64,
            _account_ids: &[String],
        ) -> Result<(), ApiError> {
            unimplemented!()
        }

        async fn portfolio(&self, _user_id: i64) -> Result<PortfolioSummary, ApiError> {
            unimplemented!()
        }

        async fn chart(
            &self,
            _user_id: i64,
            _kind: ChartKind,
            _period: Period,
        ) -> Result<Vec<u8>, ApiError> {
            self.payload
                .clone()
                .map_err(|_| ApiError::Backend("no chart".to_string()))
        }

        async fn income(&self, _user_id: i64, _period: Period) -> Result<IncomeReport, ApiError> {
            unimplemented!()
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_chart_is_cached_with_dimensions() {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path());
        let backend = ChartBackend {
            payload: Ok(png_bytes(8, 4)),
        };

        let chart = fetch_chart(&backend, &data_paths, 42, ChartKind::Capital, Period::Week)
            .await
            .unwrap();

        assert_eq!(chart.width, 8);
        assert_eq!(chart.height, 4);
        assert!(chart.path.ends_with("capital_week_42.png"));
        assert!(chart.path.exists());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path());
        let backend = ChartBackend { payload: Err(()) };

        let chart = fetch_chart(&backend, &data_paths, 42, ChartKind::Income, Period::Week).await;
        assert!(chart.is_none());
    }

    #[tokio::test]
    async fn test_garbage_payload_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let data_paths = DataPaths::new(dir.path());
        let backend = ChartBackend {
            payload: Ok(b"not a png".to_vec()),
        };

        let chart = fetch_chart(&backend, &data_paths, 42, ChartKind::Capital, Period::Week).await;
        assert!(chart.is_none());
    }
}
