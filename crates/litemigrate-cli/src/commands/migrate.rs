//! Migrate command
//!
//! Usage: litemigrate migrate [TARGET] [--commit-mode batch|per-migration] [--replay-all]

use clap::Args;
use litemigrate_core::{Target, LATEST_ALIAS};
use litemigrate_store::loader::discover_migrations;
use litemigrate_store::migrations::migrate_path;
use litemigrate_store::RunOptions;

use super::{CommitModeArg, SourceArgs};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration to migrate up to, or `latest` for all of them
    #[arg(default_value = LATEST_ALIAS)]
    pub target: String,

    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, value_enum, default_value_t = CommitModeArg::Batch)]
    pub commit_mode: CommitModeArg,

    /// Re-run migrations already recorded as applied
    #[arg(long)]
    pub replay_all: bool,
}

/// Execute migrate command
pub fn execute(args: MigrateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let set = discover_migrations(&args.source.migrations)?;

    let options = RunOptions {
        target: Target::from(args.target.as_str()),
        skip_applied: !args.replay_all,
        commit_mode: args.commit_mode.into(),
    };

    args.source.ensure_db_dir()?;
    let report = migrate_path(&args.source.db, &set, &options)?;

    if report.applied.is_empty() {
        println!("Nothing to migrate ({} already applied)", report.skipped.len());
    }
    for name in &report.applied {
        println!("✓ Applied {}", name);
    }
    println!("run_id: {}", report.run_id);

    Ok(())
}
