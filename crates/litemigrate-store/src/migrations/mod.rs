//! Migration execution
//!
//! Provides:
//! - The bookkeeping table recording applied migrations
//! - The execution engine (per-migration units of work)
//! - The run coordinator and its durability envelope
//! - Run options (target, skip-applied, commit mode)

pub mod bookkeeping;
pub mod coordinator;
pub mod options;
pub mod runner;

pub use coordinator::{MigrationRun, RunReport, RunState};
pub use options::{CommitMode, RunOptions};
pub use runner::execute_migrations;

use crate::errors::Result;
use crate::SqliteMigrationSet;

/// Open the database at `path` and run `set` with `options`
pub fn migrate_path<P: AsRef<std::path::Path>>(
    path: P,
    set: &SqliteMigrationSet,
    options: &RunOptions,
) -> Result<RunReport> {
    MigrationRun::open(path)?.execute(set, options)
}
