//! Manifest parser with validation
//!
//! Parses YAML and validates the migration name and statements

use std::fs;
use std::path::Path;

use crate::errors::{io_error, Result};
use crate::loader::format_v0::MigrationFileV0;
use crate::SqliteMigration;
use litemigrate_core::errors::MigrateError;
use litemigrate_core::rules::validation::validate_migration_name;
use litemigrate_core::Migration;

/// Parse a manifest file; the migration is named after the file stem
pub fn parse_migration_file(path: &Path) -> Result<SqliteMigration> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| MigrateError::InvalidDefinition {
            path: path.display().to_string(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;

    // Reserved names fail before the file is even read
    validate_migration_name(name)?;

    let content = fs::read_to_string(path).map_err(|e| io_error("read_migration", e))?;

    parse_migration_str(name, &content, &path.display().to_string())
}

/// Parse manifest text for the migration `name`
///
/// `origin` is only used in error messages.
pub fn parse_migration_str(name: &str, content: &str, origin: &str) -> Result<SqliteMigration> {
    validate_migration_name(name)?;

    let file: MigrationFileV0 =
        serde_yaml::from_str(content).map_err(|e| MigrateError::InvalidDefinition {
            path: origin.to_string(),
            reason: format!("YAML parse error: {}", e),
        })?;

    validate_manifest(&file, origin)?;

    let migration: SqliteMigration = file
        .depends_on
        .into_iter()
        .fold(Migration::new(name), |m, dep| m.depends_on(dep));
    let migration = file.up.into_iter().fold(migration, |m, sql| m.up_sql(sql));
    let migration = file.down.into_iter().fold(migration, |m, sql| m.down_sql(sql));

    Ok(migration)
}

fn validate_manifest(file: &MigrationFileV0, origin: &str) -> Result<()> {
    let invalid = |reason: String| MigrateError::InvalidDefinition {
        path: origin.to_string(),
        reason,
    };

    for (index, sql) in file.up.iter().enumerate() {
        if sql.trim().is_empty() {
            return Err(invalid(format!("up step {} is empty", index)).into());
        }
    }

    for (index, sql) in file.down.iter().enumerate() {
        if sql.trim().is_empty() {
            return Err(invalid(format!("down step {} is empty", index)).into());
        }
    }

    for dep in &file.depends_on {
        if dep.trim().is_empty() {
            return Err(invalid("depends_on contains an empty name".to_string()).into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use litemigrate_core::ExErrorKind;

    #[test]
    fn test_parse_builds_migration() {
        let m = parse_migration_str(
            "0002_users",
            "depends_on: [0001_initial]\nup:\n  - CREATE TABLE users (id INTEGER)\ndown:\n  - DROP TABLE users\n",
            "inline",
        )
        .unwrap();

        assert_eq!(m.name(), "0002_users");
        assert!(m.dependencies().contains("0001_initial"));
        assert_eq!(m.up_steps().len(), 1);
        assert_eq!(m.down_steps().len(), 1);
    }

    #[test]
    fn test_latest_rejected_regardless_of_content() {
        let err = parse_migration_str("latest", "this is: [not valid", "inline").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ForbiddenName);
    }

    #[test]
    fn test_empty_statement_rejected() {
        let err = parse_migration_str("m", "up:\n  - '   '\n", "inline").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidDefinition);
        assert!(err.message().contains("up step 0 is empty"));
    }

    #[test]
    fn test_yaml_error_names_origin() {
        let err = parse_migration_str("m", "up: {", "migrations/m.yaml").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidDefinition);
        assert!(err.message().contains("migrations/m.yaml"));
    }
}
