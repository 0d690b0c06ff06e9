//! lite-migrate Store - SQLite execution of ordered migrations
//!
//! Provides:
//! - Connection helpers for WAL mode and manual checkpoints
//! - The `_lm_migrations` bookkeeping table
//! - The execution engine and the crash-safe run coordinator
//! - A loader for YAML migration manifests on disk

pub mod db;
pub mod errors;
pub mod loader;
pub mod migrations;

use rusqlite::Connection;

/// Migration whose steps run against a SQLite connection
pub type SqliteMigration = litemigrate_core::Migration<Connection>;

/// Migration set whose steps run against a SQLite connection
pub type SqliteMigrationSet = litemigrate_core::MigrationSet<Connection>;

// Re-export key types
pub use errors::Result;
pub use migrations::{CommitMode, MigrationRun, RunOptions, RunReport, RunState};
