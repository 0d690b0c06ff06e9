//! Status command

use std::collections::BTreeSet;

use clap::Args;
use litemigrate_core::{order_migrations, ExError};
use litemigrate_store::loader::discover_migrations;
use litemigrate_store::migrations::bookkeeping::list_applied;
use litemigrate_store::db;

use super::SourceArgs;

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print status as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let set = discover_migrations(&args.source.migrations)?;
    let order = order_migrations(&set).map_err(ExError::from)?;

    let applied = if args.source.db.exists() {
        list_applied(&db::open(&args.source.db)?)?
    } else {
        Vec::new()
    };

    let recorded: BTreeSet<&str> = applied.iter().map(|r| r.migration_name.as_str()).collect();
    let pending: Vec<&String> = order
        .iter()
        .filter(|name| !recorded.contains(name.as_str()))
        .collect();

    if args.json {
        let value = serde_json::json!({
            "applied": applied,
            "pending": pending,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Applied ({}):", applied.len());
    for record in &applied {
        let when = chrono::DateTime::from_timestamp(record.migration_dt, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| record.migration_dt.to_string());
        println!("  ✓ {} at {}", record.migration_name, when);
    }

    println!("Pending ({}):", pending.len());
    for name in pending {
        println!("  · {}", name);
    }

    Ok(())
}
