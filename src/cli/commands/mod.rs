//! CLI Commands module
//!
//! Command implementations for the tinkview CLI. Each command follows a
//! consistent pattern with dedicated Args and Command structs.

use anyhow::Result;

use crate::account_store::AccountStore;
use crate::api::Backend;
use crate::data_paths::DataPaths;
use crate::session::Session;
use crate::setup::{self, SetupState};
use crate::token_store;

// Command modules
pub mod accounts;
pub mod income;
pub mod portfolio;
pub mod reset;
pub mod run;
pub mod token;
pub mod version;

/// Resolve the setup state and require a fully set-up user.
///
/// The print commands go through the same resolver the interactive flow
/// uses; an incomplete setup turns into an actionable error instead of a
/// screen transition.
pub(crate) async fn ensure_ready(
    session: &Session,
    data_paths: &DataPaths,
    backend: &dyn Backend,
) -> Result<Vec<String>> {
    let passphrase = token_store::get_passphrase()?;
    let account_store = AccountStore::new(data_paths);

    match setup::resolve(session, data_paths, &passphrase, &account_store, backend).await? {
        SetupState::NeedsToken { .. } => {
            anyhow::bail!("API токен не настроен. Выполните: tinkview token")
        }
        SetupState::NeedsAccounts => {
            anyhow::bail!("Счета не выбраны. Выполните: tinkview accounts --select <id,...>")
        }
        SetupState::Ready { account_ids } => Ok(account_ids),
    }
}
