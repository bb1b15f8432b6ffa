//! Per-user storage of the selected account ids
//!
//! One JSON file per user: cache/user_accounts_<user_id>.json holding the
//! ordered list of account ids the dashboard aggregates. The selection is
//! not secret, so it is stored in the clear.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::data_paths::DataPaths;

#[derive(Clone)]
pub struct AccountStore {
    cache_dir: PathBuf,
}

impl AccountStore {
    pub fn new(data_paths: &DataPaths) -> Self {
        Self {
            cache_dir: data_paths.cache(),
        }
    }

    fn file_path(&self, user_id: i64) -> PathBuf {
        self.cache_dir.join(format!("user_accounts_{}.json", user_id))
    }

    /// Load the stored selection; an empty list when nothing is stored yet
    pub async fn load(&self, user_id: i64) -> Result<Vec<String>> {
        let path = self.file_path(user_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let account_ids: Vec<String> =
            serde_json::from_str(&content).context("Failed to parse stored account selection")?;

        debug!(user_id, count = account_ids.len(), "Loaded account selection");
        Ok(account_ids)
    }

    /// Persist a new selection, replacing any previous one
    pub async fn save(&self, user_id: i64, account_ids: &[String]) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .context("Failed to create cache directory")?;

        let path = self.file_path(user_id);
        let json = serde_json::to_string_pretty(account_ids)?;
        fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(user_id, count = account_ids.len(), "Saved account selection");
        Ok(())
    }

    /// Remove the stored selection, if any
    pub async fn clear(&self, user_id: i64) -> Result<()> {
        let path = self.file_path(user_id);
        if path.exists() {
            fs::remove_file(&path)
                .await
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_selection_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::new(&DataPaths::new(dir.path()));

        let ids = vec!["acc-2".to_string(), "acc-1".to_string()];
        store.save(42, &ids).await.unwrap();

        // Order is preserved
        assert_eq!(store.load(42).await.unwrap(), ids);
    }

    #[tokio::test]
    async fn test_missing_selection_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::new(&DataPaths::new(dir.path()));

        assert!(store.load(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selection_is_per_user() {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::new(&DataPaths::new(dir.path()));

        store.save(1, &["a".to_string()]).await.unwrap();
        store.save(2, &["b".to_string()]).await.unwrap();

        assert_eq!(store.load(1).await.unwrap(), vec!["a".to_string()]);
        assert_eq!(store.load(2).await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_selection() {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::new(&DataPaths::new(dir.path()));

        store.save(42, &["a".to_string()]).await.unwrap();
        store.clear(42).await.unwrap();
        assert!(store.load(42).await.unwrap().is_empty());
    }
}
