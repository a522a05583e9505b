use std::path::PathBuf;

use anyhow::Context;
use budget_cli::app::{self, AdjustOptions, App, PromptKind};
use budget_cli::config::{AppConfig, Overrides};
use budget_cli::logging;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::debug;

/// Household budget planner.
///
/// Reads income, expenses, allocations and goals from the configured
/// database and rebalances budget allocations against current income.
#[derive(Debug, Parser)]
#[command(name = "budget", version, about)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database connection string, e.g. `budget.db` or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log level or EnvFilter directive. RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List budget allocations
    Allocations,

    /// Show income, expenses, balance and goal progress
    Summary {
        /// Trailing window length in days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Rescale active allocations to match current income
    Adjust {
        /// Show the result without saving it
        #[arg(long)]
        dry_run: bool,

        /// Also rescale allocations a previous run already adjusted
        #[arg(long)]
        include_adjusted: bool,
    },

    /// Print an advisor prompt and its answer
    #[command(subcommand)]
    Prompt(PromptCommand),
}

#[derive(Debug, Subcommand)]
enum PromptCommand {
    /// Spending recommendations
    Recommendations,
    /// Which pending expenses to pay first
    Priorities,
    /// Ask a free-form question
    Chat {
        question: String,
    },
}

impl From<PromptCommand> for PromptKind {
    fn from(command: PromptCommand) -> Self {
        match command {
            PromptCommand::Recommendations => PromptKind::Recommendations,
            PromptCommand::Priorities => PromptKind::Priorities,
            PromptCommand::Chat { question } => PromptKind::Chat(question),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(Overrides {
            database: cli.db,
            log_level: cli.log_level,
            log_file: cli.log_file,
        });

    logging::init_logging(&config.log_level, config.log_file.as_deref())?;
    debug!(?config, "configuration loaded");

    let repo = app::open_repository(&config).await?;
    let app = App::new(repo, config);
    let now = Utc::now();

    match cli.command {
        Command::Allocations => print!("{}", app.allocations().await?),
        Command::Summary { days } => print!("{}", app.summary(now, days).await?),
        Command::Adjust {
            dry_run,
            include_adjusted,
        } => {
            let options = AdjustOptions {
                dry_run,
                include_adjusted,
            };
            print!("{}", app.adjust(now, options).await?);
        }
        Command::Prompt(command) => {
            let output = app.prompt(now, command.into()).await?;
            println!("--- prompt ---");
            println!("{}", output.prompt);
            println!("--- answer ---");
            println!("{}", output.answer);
        }
    }

    Ok(())
}
