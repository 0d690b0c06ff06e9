//! Bookkeeping table
//!
//! One row per committed migration. Rows are written in the same unit of
//! work as the migration's steps and never deleted.

use std::collections::BTreeSet;

use crate::errors::{from_rusqlite, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// Name of the bookkeeping table
pub const LM_MIGRATIONS_TABLE: &str = "_lm_migrations";

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS _lm_migrations (
    migration_name TEXT PRIMARY KEY,
    migration_dt INTEGER
)";

/// A persisted bookkeeping row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigrationRecord {
    pub migration_name: String,
    /// UNIX timestamp (seconds) of when the migration was committed
    pub migration_dt: i64,
}

/// Create the bookkeeping table if it doesn't exist
pub fn ensure_table(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_TABLE_SQL, []).map_err(from_rusqlite)?;
    Ok(())
}

/// Whether the bookkeeping table exists yet
pub fn table_exists(conn: &Connection) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [LM_MIGRATIONS_TABLE],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;
    Ok(found.is_some())
}

/// Record a migration as applied now
///
/// Replaying a recorded migration refreshes its timestamp.
pub fn record_applied(conn: &Connection, migration_name: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO _lm_migrations (migration_name, migration_dt) VALUES (?1, ?2)
         ON CONFLICT(migration_name) DO UPDATE SET migration_dt = excluded.migration_dt",
        params![migration_name, now],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

/// Names of all recorded migrations
pub fn applied_names(conn: &Connection) -> Result<BTreeSet<String>> {
    Ok(list_applied(conn)?
        .into_iter()
        .map(|r| r.migration_name)
        .collect())
}

/// All bookkeeping rows, oldest first; empty if the table doesn't exist
pub fn list_applied(conn: &Connection) -> Result<Vec<AppliedMigrationRecord>> {
    if !table_exists(conn)? {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare(
            "SELECT migration_name, migration_dt FROM _lm_migrations
             ORDER BY migration_dt, migration_name",
        )
        .map_err(from_rusqlite)?;

    let records = stmt
        .query_map([], |row| {
            Ok(AppliedMigrationRecord {
                migration_name: row.get(0)?,
                migration_dt: row.get(1)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_table_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!table_exists(&conn).unwrap());

        ensure_table(&conn).unwrap();
        ensure_table(&conn).unwrap();

        assert!(table_exists(&conn).unwrap());
    }

    #[test]
    fn test_list_applied_without_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(list_applied(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_record_applied_upserts() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn).unwrap();

        record_applied(&conn, "0001_initial").unwrap();
        record_applied(&conn, "0001_initial").unwrap();
        record_applied(&conn, "0002_users").unwrap();

        let names = applied_names(&conn).unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains("0001_initial"));
        assert!(list_applied(&conn).unwrap().iter().all(|r| r.migration_dt > 0));
    }
}
