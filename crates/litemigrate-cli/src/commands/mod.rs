//! Subcommands and the arguments they share

pub mod migrate;
pub mod plan;
pub mod status;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use litemigrate_store::migrations::bookkeeping::applied_names;
use litemigrate_store::{db, CommitMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CommitModeArg {
    /// All migrations in one transaction
    Batch,
    /// One transaction per migration
    PerMigration,
}

impl From<CommitModeArg> for CommitMode {
    fn from(arg: CommitModeArg) -> Self {
        match arg {
            CommitModeArg::Batch => CommitMode::Batch,
            CommitModeArg::PerMigration => CommitMode::PerMigration,
        }
    }
}

/// Where migrations come from and where they go
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Target SQLite database
    #[arg(long, default_value = ".litemigrate/store.db")]
    pub db: PathBuf,

    /// Directory of YAML migration manifests
    #[arg(long, default_value = "migrations")]
    pub migrations: PathBuf,
}

impl SourceArgs {
    /// Recorded migration names, without creating the database if it's missing
    pub fn recorded(&self) -> Result<BTreeSet<String>, Box<dyn std::error::Error>> {
        if !self.db.exists() {
            return Ok(BTreeSet::new());
        }
        let conn = db::open(&self.db)?;
        Ok(applied_names(&conn)?)
    }

    /// Create the database's parent directory if needed
    pub fn ensure_db_dir(&self) -> std::io::Result<()> {
        match self.db.parent() {
            Some(parent) if parent != Path::new("") => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}
