//! Plan command
//!
//! Orders the discovered migrations and prints what `migrate` would apply.
//! The database is only read, never created.

use clap::Args;
use litemigrate_core::{order_migrations, plan_run, ExError, Target, LATEST_ALIAS};
use litemigrate_store::loader::discover_migrations;

use super::SourceArgs;

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Migration to plan up to, or `latest` for all of them
    #[arg(default_value = LATEST_ALIAS)]
    pub target: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Include migrations already recorded as applied
    #[arg(long)]
    pub replay_all: bool,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: PlanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let set = discover_migrations(&args.source.migrations)?;
    let order = order_migrations(&set).map_err(ExError::from)?;
    let recorded = args.source.recorded()?;
    let target = Target::from(args.target.as_str());

    let plan = plan_run(&order, &set, &target, &recorded, !args.replay_all)
        .map_err(ExError::from)?;

    if args.json {
        let value = serde_json::json!({
            "target": target.to_string(),
            "order": order,
            "to_apply": plan.to_apply,
            "skipped": plan.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Plan for {} ({} migrations):", target, plan.to_apply.len());
    for name in &plan.to_apply {
        println!("  apply {}", name);
    }
    for name in &plan.skipped {
        println!("  skip  {} (already applied)", name);
    }

    Ok(())
}
