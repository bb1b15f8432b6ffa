//! Token command: submit an API token for validation and store it

use anyhow::{anyhow, Result};
use clap::Args;
use owo_colors::OwoColorize;

use crate::api::{Backend, PortfolioApiClient};
use crate::data_paths::DataPaths;
use crate::session::Session;
use crate::token_store;

#[derive(Args, Clone)]
pub struct TokenArgs {
    /// Token value; prompted securely when omitted
    #[arg(long)]
    pub token: Option<String>,
}

pub struct TokenCommand {
    args: TokenArgs,
}

impl TokenCommand {
    pub fn new(args: TokenArgs) -> Self {
        Self { args }
    }

    pub async fn execute(
        &self,
        host: &str,
        data_paths: DataPaths,
        session: Session,
    ) -> Result<()> {
        let token = match &self.args.token {
            Some(token) => token.clone(),
            None => rpassword::prompt_password("API токен: ")?,
        };

        let token = token.trim().to_string();
        if token.is_empty() {
            // Validation error: nothing is sent to the backend
            return Err(anyhow!("Токен не может быть пустым"));
        }

        let backend = PortfolioApiClient::new(host)?;
        let valid = backend.validate_token(session.user_id, &token).await?;

        if !valid {
            println!("{}", "Неверный токен, обновите его".red());
            return Err(anyhow!("Backend rejected the token"));
        }

        // Persist only a token the backend accepted
        let passphrase = token_store::get_passphrase()?;
        token_store::save_token(&data_paths, session.user_id, &token, &passphrase)?;

        println!("{}", "Токен проверен и сохранен".green());
        Ok(())
    }
}
