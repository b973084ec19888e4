//! OrderVault CLI
//!
//! Command-line interface for the order repository

use clap::{Parser, Subcommand};
use ordervault_core::core_types::OpContext;
use ordervault_core::logging_facility::{init, Profile};
use ordervault_engine::{OrderRepository, RepositoryConfig};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "ordervault")]
#[command(about = "OrderVault - cache-aside order storage", long_about = None)]
struct Cli {
    /// SQLite database file (overrides ORDERVAULT_DSN)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Cache capacity (overrides ORDERVAULT_CACHE_CAPACITY)
    #[arg(long, global = true)]
    capacity: Option<usize>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import orders from JSON files
    Import(commands::import::ImportArgs),
    /// Print one order as JSON
    Get(commands::get::GetArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = RepositoryConfig::from_env()?;
    if let Some(db) = cli.db {
        config.dsn = db.display().to_string().into();
    }
    if let Some(capacity) = cli.capacity {
        config.cache_capacity = capacity;
    }

    let ctx = OpContext::background();
    let repo = OrderRepository::open(&config, &ctx)?;

    let result = match cli.command {
        Commands::Import(args) => commands::import::execute(&repo, &ctx, args),
        Commands::Get(args) => commands::get::execute(&repo, &ctx, args),
    };

    repo.close()?;
    result
}
