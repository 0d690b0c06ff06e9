//! lite-migrate CLI
//!
//! Command-line interface for applying dependency-ordered SQLite migrations

use clap::{Parser, Subcommand};
use litemigrate_core::logging_facility::{init, Profile};

mod commands;

use commands::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "litemigrate")]
#[command(about = "lite-migrate - Dependency-ordered SQLite migrations", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Human)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending migrations up to a target
    Migrate(commands::migrate::MigrateArgs),
    /// Show what a migrate run would do, without executing it
    Plan(commands::plan::PlanArgs),
    /// List applied and pending migrations
    Status(commands::status::StatusArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Migrate(args) => commands::migrate::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Status(args) => commands::status::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
