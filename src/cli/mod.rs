//! CLI module for tinkview
//!
//! Command-line interface for the portfolio client. clap argument parsing
//! with a structured command pattern: one Args/Command pair per subcommand.

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub mod commands;

use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{init_logging, LogMode, LoggingConfig};
use crate::session;

use commands::accounts::{AccountsArgs, AccountsCommand};
use commands::income::{IncomeArgs, IncomeCommand};
use commands::portfolio::{PortfolioArgs, PortfolioCommand};
use commands::reset::{ResetArgs, ResetCommand};
use commands::run::{RunArgs, RunCommand};
use commands::token::{TokenArgs, TokenCommand};
use commands::version::{VersionArgs, VersionCommand};

#[derive(Parser)]
#[command(name = "tinkview")]
#[command(version)]
#[command(about = "Terminal companion for the Tinkoff Invest portfolio mini app", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL
    #[arg(long, global = true, default_value = "http://localhost:8080")]
    pub host: String,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Identity override for development (skips host init data)
    #[arg(long, global = true)]
    pub user: Option<i64>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive interface (setup → accounts → dashboard)
    Run(RunArgs),

    /// Submit and validate an API token
    Token(TokenArgs),

    /// List backend accounts or store a new selection
    Accounts(AccountsArgs),

    /// Print the portfolio summary and top positions
    Portfolio(PortfolioArgs),

    /// Print the income breakdown for a period
    Income(IncomeArgs),

    /// Clear the cached token and account selection
    Reset(ResetArgs),

    /// Show version information
    Version(VersionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let data_paths = DataPaths::new(&self.data_dir);

        // Ensure all directories exist
        data_paths.ensure_directories()?;

        // The interactive interface logs to file only; everything else also
        // logs to the console
        let mode = match &self.command {
            Commands::Run(_) => LogMode::FileOnly,
            _ => LogMode::ConsoleAndFile,
        };
        init_logging(LoggingConfig::new(mode, data_paths.clone()))?;

        // Version needs no identity and no network
        if let Commands::Version(args) = &self.command {
            return VersionCommand::new(args.clone()).execute().await;
        }

        // Acquire the host identity exactly once; nothing proceeds without it
        let session = match session::bootstrap(self.user) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Initialization failed: {}", e);
                eprintln!("{}", "Ошибка инициализации: нет данных пользователя".red());
                return Err(e.into());
            }
        };

        let host = self.host.as_str();
        match self.command {
            Commands::Run(args) => RunCommand::new(args).execute(host, data_paths, session).await,
            Commands::Token(args) => {
                TokenCommand::new(args)
                    .execute(host, data_paths, session)
                    .await
            }
            Commands::Accounts(args) => {
                AccountsCommand::new(args)
                    .execute(host, data_paths, session)
                    .await
            }
            Commands::Portfolio(args) => {
                PortfolioCommand::new(args)
                    .execute(host, data_paths, session)
                    .await
            }
            Commands::Income(args) => {
                IncomeCommand::new(args)
                    .execute(host, data_paths, session)
                    .await
            }
            Commands::Reset(args) => {
                ResetCommand::new(args)
                    .execute(host, data_paths, session)
                    .await
            }
            Commands::Version(_) => unreachable!("handled above"),
        }
    }
}
