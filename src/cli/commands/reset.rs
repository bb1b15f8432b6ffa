//! Reset command: clear the cached token and account selection

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use crate::account_store::AccountStore;
use crate::data_paths::DataPaths;
use crate::session::Session;
use crate::token_store;

#[derive(Args, Clone)]
pub struct ResetArgs {}

pub struct ResetCommand {
    _args: ResetArgs,
}

impl ResetCommand {
    pub fn new(args: ResetArgs) -> Self {
        Self { _args: args }
    }

    pub async fn execute(
        &self,
        _host: &str,
        data_paths: DataPaths,
        session: Session,
    ) -> Result<()> {
        token_store::clear_token(&data_paths, session.user_id)?;
        AccountStore::new(&data_paths).clear(session.user_id).await?;

        println!("{}", "Локальные данные пользователя удалены".green());
        Ok(())
    }
}
