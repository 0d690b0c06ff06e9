//! Migration discovery
//!
//! Reads a directory of YAML manifests into a migration set. Files are
//! visited in path order; stems starting with `.` or `_` are ignored.

pub mod format_v0;
pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{io_error, Result};
use crate::SqliteMigrationSet;
use litemigrate_core::rules::validation::validate_migration_name;

pub use parser::{parse_migration_file, parse_migration_str};

fn is_manifest(path: &Path) -> bool {
    let has_yaml_ext = path
        .extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false);

    let hidden = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with('.') || s.starts_with('_'))
        .unwrap_or(true);

    path.is_file() && has_yaml_ext && !hidden
}

/// Discover and parse every manifest in `dir`
///
/// All names are checked against the reserved alias before any file is
/// parsed.
///
/// # Errors
/// * `ForbiddenMigrationName` - a manifest is named `latest`
/// * `InvalidDefinition` - a manifest fails to parse
/// * `DuplicateMigration` - `x.yaml` and `x.yml` both exist
/// * Io - the directory can't be read
pub fn discover_migrations(dir: &Path) -> Result<SqliteMigrationSet> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| io_error("discover_migrations", e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_manifest(p))
        .collect();

    files.sort();

    for file in &files {
        if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
            validate_migration_name(stem)?;
        }
    }

    let mut set = SqliteMigrationSet::new();
    for file in &files {
        tracing::debug!(path = %file.display(), "loading migration");
        set.insert(parse_migration_file(file)?)?;
    }

    Ok(set)
}
