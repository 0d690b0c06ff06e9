use std::collections::BTreeMap;

use super::migration::Migration;
use crate::errors::{MigrateError, Result};
use crate::rules::validation::validate_migration_name;

/// Name-keyed collection of migrations loaded for one run
///
/// Iteration is ordered by name, which makes graph construction and the
/// computed execution order reproducible across runs.
pub struct MigrationSet<H: ?Sized> {
    migrations: BTreeMap<String, Migration<H>>,
}

impl<H: ?Sized> MigrationSet<H> {
    pub fn new() -> Self {
        Self {
            migrations: BTreeMap::new(),
        }
    }

    /// Build a set from migrations, validating each name
    ///
    /// # Errors
    /// * `ForbiddenMigrationName` - a migration is named `latest`
    /// * `InvalidMigrationName` - a migration name is empty
    /// * `DuplicateMigration` - two migrations share a name
    pub fn from_migrations<I>(migrations: I) -> Result<Self>
    where
        I: IntoIterator<Item = Migration<H>>,
    {
        let mut set = Self::new();
        for migration in migrations {
            set.insert(migration)?;
        }
        Ok(set)
    }

    /// Add a migration, rejecting reserved, empty and duplicate names
    pub fn insert(&mut self, migration: Migration<H>) -> Result<()> {
        validate_migration_name(migration.name())?;

        if self.migrations.contains_key(migration.name()) {
            return Err(MigrateError::DuplicateMigration {
                name: migration.name().to_string(),
            });
        }

        self.migrations
            .insert(migration.name().to_string(), migration);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Migration<H>> {
        self.migrations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.migrations.contains_key(name)
    }

    /// Migration names in iteration (name) order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.migrations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Migration<H>> {
        self.migrations.values()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

impl<H: ?Sized> Default for MigrationSet<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> std::fmt::Debug for MigrationSet<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.migrations.values()).finish()
    }
}
