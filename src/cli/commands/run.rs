//! Run command: the interactive setup/accounts/dashboard flow

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use crate::api::PortfolioApiClient;
use crate::data_paths::DataPaths;
use crate::session::Session;
use crate::token_store;
use crate::tui;

#[derive(Args, Clone)]
pub struct RunArgs {}

pub struct RunCommand {
    _args: RunArgs,
}

impl RunCommand {
    pub fn new(args: RunArgs) -> Self {
        Self { _args: args }
    }

    pub async fn execute(
        &self,
        host: &str,
        data_paths: DataPaths,
        session: Session,
    ) -> Result<()> {
        // The passphrase prompt must happen before the alternate screen
        let passphrase = token_store::get_passphrase()?;

        let backend = Arc::new(PortfolioApiClient::new(host)?);

        tui::run(session, backend, data_paths, passphrase).await
    }
}
