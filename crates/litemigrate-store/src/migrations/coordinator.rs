//! Run coordinator
//!
//! Owns the durability envelope around a batch of migrations:
//!
//! `Closed -> Opened -> Locked -> BookkeepingEnsured -> Executing -> Checkpointed -> NormalMode`
//!
//! The database is put in WAL mode with automatic checkpoints disabled and
//! the write lock is taken with `BEGIN IMMEDIATE` before anything changes.
//! Only a fully successful run checkpoints the WAL and restores `DELETE`
//! journaling. A failed run does neither and returns the error.

use std::path::Path;
use std::time::Instant;

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::bookkeeping::{applied_names, ensure_table};
use crate::migrations::options::{CommitMode, RunOptions};
use crate::migrations::runner::{execute_in_transaction, execute_per_migration};
use crate::SqliteMigrationSet;
use litemigrate_core::{log_op_end, log_op_error, log_op_start, order_migrations, plan_run};
use litemigrate_core_types::RunId;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

/// Connection lifecycle during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Closed,
    Opened,
    Locked,
    BookkeepingEnsured,
    Executing,
    Checkpointed,
    NormalMode,
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub commit_mode: CommitMode,
    /// Full topological order of the discovered set
    pub order: Vec<String>,
    /// Migrations applied by this run, in execution order
    pub applied: Vec<String>,
    /// Migrations left alone because they were already recorded
    pub skipped: Vec<String>,
}

/// A single migration run against one writer connection
pub struct MigrationRun {
    conn: Connection,
    state: RunState,
    run_id: RunId,
}

fn transition(state: &mut RunState, next: RunState, run_id: &RunId) {
    tracing::debug!(run_id = %run_id, from = ?*state, to = ?next, "run state transition");
    *state = next;
}

impl MigrationRun {
    /// Open the target database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_connection(db::open(path)?))
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(db::open_in_memory()?))
    }

    /// Adopt an already-open connection
    pub fn from_connection(conn: Connection) -> Self {
        let run_id = RunId::new();
        let mut state = RunState::Closed;
        transition(&mut state, RunState::Opened, &run_id);
        Self {
            conn,
            state,
            run_id,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Give the connection back, e.g. to inspect the migrated database
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Order, plan and apply `set` inside the durability envelope
    ///
    /// Ordering happens before the database is touched, so a cycle or an
    /// unresolved dependency leaves it byte-for-byte unchanged.
    ///
    /// # Errors
    /// * Ordering and planning errors from litemigrate-core
    /// * `StepFailed` when a step fails; nothing is checkpointed
    /// * Persistence errors from SQLite
    pub fn execute(&mut self, set: &SqliteMigrationSet, options: &RunOptions) -> Result<RunReport> {
        let started = Instant::now();
        log_op_start!(
            "migrate",
            run_id = %self.run_id,
            target = %options.target,
            migrations = set.len()
        );

        match self.execute_inner(set, options) {
            Ok(report) => {
                log_op_end!(
                    "migrate",
                    duration_ms = started.elapsed().as_millis() as u64,
                    run_id = %self.run_id,
                    applied = report.applied.len(),
                    skipped = report.skipped.len()
                );
                Ok(report)
            }
            Err(err) => {
                let err = err.with_run_id(self.run_id.clone());
                log_op_error!(
                    "migrate",
                    err.clone(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    run_id = %self.run_id,
                    state = ?self.state
                );
                Err(err)
            }
        }
    }

    fn execute_inner(&mut self, set: &SqliteMigrationSet, options: &RunOptions) -> Result<RunReport> {
        let order = order_migrations(set)?;

        let mode = db::enable_manual_wal(&self.conn)?;
        tracing::debug!(run_id = %self.run_id, journal_mode = %mode, "manual WAL enabled");

        let plan;
        let applied;

        match options.commit_mode {
            CommitMode::Batch => {
                let mut tx = self
                    .conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(from_rusqlite)?;
                transition(&mut self.state, RunState::Locked, &self.run_id);

                ensure_table(&tx)?;
                transition(&mut self.state, RunState::BookkeepingEnsured, &self.run_id);

                let recorded = applied_names(&tx)?;
                plan = plan_run(&order, set, &options.target, &recorded, options.skip_applied)?;

                transition(&mut self.state, RunState::Executing, &self.run_id);
                applied = execute_in_transaction(&mut tx, set, &plan.to_apply)?;
                tx.commit().map_err(from_rusqlite)?;
            }
            CommitMode::PerMigration => {
                let tx = self
                    .conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(from_rusqlite)?;
                transition(&mut self.state, RunState::Locked, &self.run_id);

                ensure_table(&tx)?;
                transition(&mut self.state, RunState::BookkeepingEnsured, &self.run_id);

                let recorded = applied_names(&tx)?;
                tx.commit().map_err(from_rusqlite)?;
                plan = plan_run(&order, set, &options.target, &recorded, options.skip_applied)?;

                transition(&mut self.state, RunState::Executing, &self.run_id);
                applied = execute_per_migration(&mut self.conn, set, &plan.to_apply)?;
            }
        }

        let stats = db::checkpoint_truncate(&self.conn)?;
        tracing::debug!(
            run_id = %self.run_id,
            wal_frames = stats.wal_frames,
            checkpointed = stats.checkpointed_frames,
            "WAL checkpointed"
        );
        transition(&mut self.state, RunState::Checkpointed, &self.run_id);

        db::restore_journal_mode(&self.conn)?;
        transition(&mut self.state, RunState::NormalMode, &self.run_id);

        Ok(RunReport {
            run_id: self.run_id.clone(),
            commit_mode: options.commit_mode,
            order,
            applied,
            skipped: plan.skipped,
        })
    }
}
