//! Accounts command: list backend accounts or store a new selection

use anyhow::{anyhow, Result};
use clap::Args;
use comfy_table::Table;
use owo_colors::OwoColorize;

use crate::account_store::AccountStore;
use crate::api::{Backend, PortfolioApiClient};
use crate::data_paths::DataPaths;
use crate::format::format_rub;
use crate::session::Session;

#[derive(Args, Clone)]
pub struct AccountsArgs {
    /// Comma-separated account ids to store as the new selection
    #[arg(long, value_delimiter = ',')]
    pub select: Option<Vec<String>>,
}

pub struct AccountsCommand {
    args: AccountsArgs,
}

impl AccountsCommand {
    pub fn new(args: AccountsArgs) -> Self {
        Self { args }
    }

    pub async fn execute(
        &self,
        host: &str,
        data_paths: DataPaths,
        session: Session,
    ) -> Result<()> {
        let backend = PortfolioApiClient::new(host)?;
        let account_store = AccountStore::new(&data_paths);

        let known = backend.accounts(session.user_id).await?;

        match &self.args.select {
            Some(selection) => {
                if selection.is_empty() {
                    // Validation error: nothing is sent to the backend
                    return Err(anyhow!("Выберите хотя бы один счет"));
                }

                let unknown: Vec<&String> = selection
                    .iter()
                    .filter(|id| !known.iter().any(|account| &account.id == *id))
                    .collect();
                if !unknown.is_empty() {
                    return Err(anyhow!(
                        "Неизвестные счета: {}",
                        unknown
                            .iter()
                            .map(|id| id.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ));
                }

                backend.save_accounts(session.user_id, selection).await?;
                account_store.save(session.user_id, selection).await?;

                println!(
                    "{}",
                    format!("Сохранено счетов: {}", selection.len()).green()
                );
            }
            None => {
                let selected = account_store.load(session.user_id).await?;

                let mut table = Table::new();
                table.set_header(vec!["", "ID", "Название", "Тип", "Стоимость"]);
                for account in &known {
                    let marker = if selected.contains(&account.id) {
                        "✓"
                    } else {
                        ""
                    };
                    table.add_row(vec![
                        marker.to_string(),
                        account.id.clone(),
                        account.name.clone(),
                        account.kind.clone(),
                        format_rub(account.portfolio_value),
                    ]);
                }
                println!("{table}");
            }
        }

        Ok(())
    }
}
