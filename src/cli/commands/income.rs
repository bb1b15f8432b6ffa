//! Income command: print the income breakdown for a period

use anyhow::{anyhow, Result};
use clap::Args;
use owo_colors::OwoColorize;

use crate::api::{Backend, Period, PortfolioApiClient};
use crate::data_paths::DataPaths;
use crate::format::format_rub;
use crate::session::Session;

#[derive(Args, Clone)]
pub struct IncomeArgs {
    /// Reporting period: day, week, month, year or all-time
    #[arg(long, default_value = "week")]
    pub period: String,
}

pub struct IncomeCommand {
    args: IncomeArgs,
}

impl IncomeCommand {
    pub fn new(args: IncomeArgs) -> Self {
        Self { args }
    }

    pub async fn execute(
        &self,
        host: &str,
        data_paths: DataPaths,
        session: Session,
    ) -> Result<()> {
        let period: Period = self.args.period.parse().map_err(|e: String| anyhow!(e))?;

        let backend = PortfolioApiClient::new(host)?;
        super::ensure_ready(&session, &data_paths, &backend).await?;

        let report = backend.income(session.user_id, period).await?;

        println!("{}", format!("Доходность за {}:", period.label()).bold());
        println!("Общий доход:    {}", format_rub(report.total_income));
        println!("От облигаций:   {}", format_rub(report.bond_income));
        println!("От дивидендов:  {}", format_rub(report.dividend_income));
        println!("Комиссии:       {}", format_rub(report.commission_expenses));
        // Net is derived here, never fetched
        println!(
            "{} {}",
            "Чистый доход:  ".bold(),
            format_rub(report.net_income()).green()
        );

        Ok(())
    }
}
