use litemigrate_core::Target;
use serde::Serialize;

/// Where commit boundaries fall during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitMode {
    /// One transaction for the whole run, one savepoint per migration.
    /// Any failure leaves the database as it was before the run.
    #[default]
    Batch,
    /// One transaction per migration. A failure keeps the migrations
    /// committed before it.
    PerMigration,
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub target: Target,
    /// Skip migrations already recorded in the bookkeeping table
    pub skip_applied: bool,
    pub commit_mode: CommitMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target: Target::Latest,
            skip_applied: true,
            commit_mode: CommitMode::Batch,
        }
    }
}
