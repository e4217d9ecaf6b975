//! Topo CLI
//!
//! Command-line interface for set lifecycle operations on a SQLite store

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use topo_core::logging_facility::{self, Profile};

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "topo")]
#[command(about = "Topo - business topology set management", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to ./topo.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path, overrides the configuration file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Supplier account the requests run as, overrides the configuration file
    #[arg(long, global = true)]
    supplier_account: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Set lifecycle operations
    Set(commands::set::SetArgs),
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::CliConfig::load(cli.config.as_deref())?
        .with_overrides(cli.db, cli.supplier_account);

    let profile: Profile = config.log_profile.parse()?;
    logging_facility::init(profile);

    match cli.command {
        Commands::Set(args) => commands::set::execute(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
