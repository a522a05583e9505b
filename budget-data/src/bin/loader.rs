use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use budget_data::{RecordKind, RecordLoader};
use budget_db_sqlite::SqliteRepository;
use clap::Parser;

fn parse_kind(s: &str) -> Result<RecordKind, String> {
    RecordKind::parse(s).ok_or_else(|| {
        format!(
            "unknown kind '{}' (expected income, expenses, allocations or goals)",
            s
        )
    })
}

/// Load income, expense, budget allocation or goal records from a CSV file
/// into the database.
///
/// Expected columns per kind:
/// - income: description, kind, amount, status, received_on
/// - expenses: description, amount, category, date, status
/// - allocations: category, allocated_amount, spent_amount, priority
/// - goals: title, target_amount, current_amount, deadline, status
#[derive(Parser, Debug)]
#[command(name = "budget-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Record kind: income, expenses, allocations or goals
    #[arg(short, long, value_parser = parse_kind)]
    kind: RecordKind,

    /// Path to the CSV file
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:budget.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:budget.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    println!(
        "Loading {} from: {}",
        args.kind.as_str(),
        args.file.display()
    );

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let batch = RecordLoader::parse(args.kind, file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", batch.len());

    let inserted = RecordLoader::load(&repo, &batch)
        .await
        .with_context(|| format!("Failed to load {} into database", args.kind.as_str()))?;

    println!(
        "Successfully loaded {} {} records into the database.",
        inserted,
        args.kind.as_str()
    );

    Ok(())
}
