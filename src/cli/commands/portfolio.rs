//! Portfolio command: print the summary and top positions

use anyhow::Result;
use clap::Args;
use comfy_table::Table;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::api::{Backend, PortfolioApiClient};
use crate::data_paths::DataPaths;
use crate::format::{build_positions_view, format_rub, format_rub_signed};
use crate::session::Session;

#[derive(Args, Clone)]
pub struct PortfolioArgs {}

pub struct PortfolioCommand {
    _args: PortfolioArgs,
}

impl PortfolioCommand {
    pub fn new(args: PortfolioArgs) -> Self {
        Self { _args: args }
    }

    pub async fn execute(
        &self,
        host: &str,
        data_paths: DataPaths,
        session: Session,
    ) -> Result<()> {
        let backend = PortfolioApiClient::new(host)?;
        super::ensure_ready(&session, &data_paths, &backend).await?;

        let summary = backend.portfolio(session.user_id).await?;

        println!(
            "{} {}",
            "Общая стоимость:".bold(),
            format_rub(summary.total_value).green()
        );
        println!(
            "Акции: {}   Облигации: {}   Фонды: {}",
            summary.stocks.len(),
            summary.bonds.len(),
            summary.etfs.len()
        );
        println!();

        let view = build_positions_view(&summary.positions);
        if view.rows.is_empty() {
            println!("Позиций нет");
            return Ok(());
        }

        let mut table = Table::new();
        table.set_header(vec!["Инструмент", "Стоимость", "Доходность"]);
        for position in &view.rows {
            let yield_text = format_rub_signed(position.yield_value);
            let yield_cell = if position.yield_value >= Decimal::ZERO {
                yield_text.green().to_string()
            } else {
                yield_text.red().to_string()
            };
            table.add_row(vec![
                position.name.clone(),
                format_rub(position.value),
                yield_cell,
            ]);
        }
        println!("{table}");

        if view.hidden > 0 {
            println!("{}", format!("+{} ещё", view.hidden).dimmed());
        }

        Ok(())
    }
}
