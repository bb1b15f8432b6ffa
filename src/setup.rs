//! Setup state resolution
//!
//! Classifies onboarding progress into an explicit state: the user still
//! needs a token, still needs to pick accounts, or is ready for the
//! dashboard. The state is derived, never stored; every entry into the app
//! (and every loop back from the setup or accounts screen) recomputes it.

use anyhow::{Context, Result};

use crate::account_store::AccountStore;
use crate::api::{Account, Backend};
use crate::data_paths::DataPaths;
use crate::session::Session;
use crate::token_store;

#[derive(Debug, Clone, PartialEq)]
pub enum SetupState {
    /// No usable token; `rejected` when the backend refused a cached one
    NeedsToken { rejected: bool },
    /// Token accepted, but no account selection survives reconciliation
    NeedsAccounts,
    /// Token accepted and a reconciled, non-empty selection exists
    Ready { account_ids: Vec<String> },
}

/// Verdict on the cached token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenCheck {
    Missing,
    Rejected,
    Valid,
}

/// Pure classification core; all I/O happens in [`resolve`].
pub fn classify(
    check: TokenCheck,
    stored_selection: &[String],
    known_accounts: &[Account],
) -> SetupState {
    match check {
        TokenCheck::Missing => SetupState::NeedsToken { rejected: false },
        TokenCheck::Rejected => SetupState::NeedsToken { rejected: true },
        TokenCheck::Valid => {
            let account_ids = reconcile(stored_selection, known_accounts);
            if account_ids.is_empty() {
                SetupState::NeedsAccounts
            } else {
                SetupState::Ready { account_ids }
            }
        }
    }
}

/// Intersect the stored selection with the backend account list.
///
/// Stored order is preserved; ids the backend no longer knows (closed or
/// revoked accounts) are dropped rather than trusted blindly.
pub fn reconcile(stored_selection: &[String], known_accounts: &[Account]) -> Vec<String> {
    stored_selection
        .iter()
        .filter(|id| known_accounts.iter().any(|account| &account.id == *id))
        .cloned()
        .collect()
}

/// Determine the screen for the current session.
///
/// Sequential and short-circuiting: cached token first, then the backend's
/// verdict on it, then the account selection. Network failures bubble up as
/// errors; the caller shows a generic setup-check status without trying to
/// tell transient failures from authoritative rejections.
pub async fn resolve(
    session: &Session,
    data_paths: &DataPaths,
    passphrase: &str,
    account_store: &AccountStore,
    backend: &dyn Backend,
) -> Result<SetupState> {
    let token = token_store::load_token(data_paths, session.user_id, passphrase)
        .context("Failed to read cached token")?;

    let token = match token {
        Some(token) => token,
        None => return Ok(SetupState::NeedsToken { rejected: false }),
    };

    let valid = backend
        .validate_token(session.user_id, &token)
        .await
        .context("Token validation request failed")?;
    if !valid {
        return Ok(SetupState::NeedsToken { rejected: true });
    }

    let stored = account_store.load(session.user_id).await?;
    let known = backend
        .accounts(session.user_id)
        .await
        .context("Account list request failed")?;

    Ok(classify(TokenCheck::Valid, &stored, &known))
}
