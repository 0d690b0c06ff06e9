use crate::errors::{MigrateError, Result};

/// Target alias meaning "everything discovered"; never a migration name
pub const LATEST_ALIAS: &str = "latest";

/// Validate a would-be migration name
///
/// Runs before a migration enters any set or graph.
///
/// # Errors
/// * `ForbiddenMigrationName` - the name is the reserved alias
/// * `InvalidMigrationName` - the name is empty or only whitespace
pub fn validate_migration_name(name: &str) -> Result<()> {
    if name == LATEST_ALIAS {
        return Err(MigrateError::ForbiddenMigrationName {
            name: name.to_string(),
        });
    }

    if name.trim().is_empty() {
        return Err(MigrateError::InvalidMigrationName {
            name: name.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }

    Ok(())
}
