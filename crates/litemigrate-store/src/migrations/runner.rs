//! Execution engine
//!
//! Applies ordered migrations against SQLite. Each migration's up-steps run
//! in listed order and its bookkeeping row is written in the same unit of
//! work; the first failing step aborts the run.

use std::time::Instant;

use crate::errors::{from_rusqlite, Result};
use crate::migrations::bookkeeping::{ensure_table, record_applied};
use crate::migrations::options::CommitMode;
use crate::{SqliteMigration, SqliteMigrationSet};
use litemigrate_core::errors::MigrateError;
use litemigrate_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Apply one migration's up-steps and record it
///
/// Runs against whatever unit of work `conn` is in; committing is the
/// caller's job.
pub fn apply_migration(conn: &Connection, migration: &SqliteMigration) -> Result<()> {
    let started = Instant::now();
    log_op_start!(
        "apply_migration",
        migration = migration.name(),
        steps = migration.up_steps().len()
    );

    let result = apply_steps(conn, migration).and_then(|()| record_applied(conn, migration.name()));

    match &result {
        Ok(()) => log_op_end!(
            "apply_migration",
            duration_ms = started.elapsed().as_millis() as u64,
            migration = migration.name()
        ),
        Err(err) => log_op_error!(
            "apply_migration",
            err.clone(),
            duration_ms = started.elapsed().as_millis() as u64,
            migration = migration.name()
        ),
    }

    result
}

fn apply_steps(conn: &Connection, migration: &SqliteMigration) -> Result<()> {
    for (index, step) in migration.up_steps().iter().enumerate() {
        tracing::debug!(
            migration = migration.name(),
            step = index,
            action = %step.describe(),
            "applying step"
        );

        step.apply(conn).map_err(|err| MigrateError::StepFailed {
            migration: migration.name().to_string(),
            step: index,
            message: err.to_string(),
        })?;
    }
    Ok(())
}

fn lookup<'a>(set: &'a SqliteMigrationSet, name: &str) -> Result<&'a SqliteMigration> {
    set.get(name).ok_or_else(|| {
        MigrateError::MigrationNotFound {
            name: name.to_string(),
        }
        .into()
    })
}

/// Apply migrations inside an open transaction, one savepoint each
///
/// A failing migration's savepoint is rolled back and the error returned;
/// the enclosing transaction is left for the caller to drop.
pub fn execute_in_transaction(
    tx: &mut Transaction<'_>,
    set: &SqliteMigrationSet,
    order: &[String],
) -> Result<Vec<String>> {
    let mut applied = Vec::with_capacity(order.len());

    for name in order {
        let migration = lookup(set, name)?;

        let savepoint = tx.savepoint().map_err(from_rusqlite)?;
        apply_migration(&savepoint, migration)?;
        savepoint.commit().map_err(from_rusqlite)?;

        applied.push(name.clone());
    }

    Ok(applied)
}

/// Apply migrations with one `IMMEDIATE` transaction each
///
/// Every migration is committed before the next starts, so a failure keeps
/// the already-committed prefix.
pub fn execute_per_migration(
    conn: &mut Connection,
    set: &SqliteMigrationSet,
    order: &[String],
) -> Result<Vec<String>> {
    let mut applied = Vec::with_capacity(order.len());

    for name in order {
        let migration = lookup(set, name)?;

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;
        apply_migration(&tx, migration)?;
        tx.commit().map_err(from_rusqlite)?;

        applied.push(name.clone());
    }

    Ok(applied)
}

/// Apply `order` against `conn` with the commit boundaries `mode` asks for
///
/// Creates the bookkeeping table if needed. Runs outside any durability
/// envelope; [`MigrationRun`](crate::MigrationRun) wraps this sequence in
/// WAL and checkpoint handling.
pub fn execute_migrations(
    conn: &mut Connection,
    set: &SqliteMigrationSet,
    order: &[String],
    mode: CommitMode,
) -> Result<Vec<String>> {
    match mode {
        CommitMode::Batch => {
            let mut tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(from_rusqlite)?;
            ensure_table(&tx)?;
            let applied = execute_in_transaction(&mut tx, set, order)?;
            tx.commit().map_err(from_rusqlite)?;
            Ok(applied)
        }
        CommitMode::PerMigration => {
            ensure_table(conn)?;
            execute_per_migration(conn, set, order)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::bookkeeping::{applied_names, table_exists};
    use litemigrate_core::Migration;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_table(&conn).unwrap();
        conn
    }

    fn table_count(conn: &Connection, name: &str) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_apply_migration_records_bookkeeping() {
        let conn = setup();
        let m: SqliteMigration = Migration::new("initial").up_sql("CREATE TABLE a (id INTEGER)");

        apply_migration(&conn, &m).unwrap();

        assert_eq!(table_count(&conn, "a"), 1);
        assert!(applied_names(&conn).unwrap().contains("initial"));
    }

    #[test]
    fn test_failing_step_reports_index() {
        let conn = setup();
        let m: SqliteMigration = Migration::new("broken")
            .up_sql("CREATE TABLE a (id INTEGER)")
            .up_sql("INSERT INTO missing VALUES (1)");

        let err = apply_migration(&conn, &m).unwrap_err();

        assert_eq!(err.migration(), Some("broken"));
        assert_eq!(err.step(), Some(1));
        assert!(!applied_names(&conn).unwrap().contains("broken"));
    }

    #[test]
    fn test_savepoint_rolls_back_failed_migration_only() {
        let mut conn = setup();
        let set = SqliteMigrationSet::from_migrations(vec![
            Migration::new("first").up_sql("CREATE TABLE a (id INTEGER)"),
            Migration::new("second")
                .depends_on("first")
                .up_sql("CREATE TABLE b (id INTEGER)")
                .up_sql("INSERT INTO nope VALUES (1)"),
        ])
        .unwrap();
        let order = vec!["first".to_string(), "second".to_string()];

        let mut tx = conn.transaction().unwrap();
        let result = execute_in_transaction(&mut tx, &set, &order);
        assert!(result.is_err());

        // first's savepoint was released, second's rolled back
        assert_eq!(table_count(&tx, "a"), 1);
        assert_eq!(table_count(&tx, "b"), 0);
        drop(tx);

        // dropping the outer transaction discards everything
        assert_eq!(table_count(&conn, "a"), 0);
    }

    fn failing_pair() -> SqliteMigrationSet {
        SqliteMigrationSet::from_migrations(vec![
            Migration::new("first").up_sql("CREATE TABLE a (id INTEGER)"),
            Migration::new("second")
                .depends_on("first")
                .up_sql("INSERT INTO nope VALUES (1)"),
        ])
        .unwrap()
    }

    #[test]
    fn test_execute_migrations_batch_is_all_or_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        let order = vec!["first".to_string(), "second".to_string()];

        let err = execute_migrations(&mut conn, &failing_pair(), &order, CommitMode::Batch)
            .unwrap_err();

        assert_eq!(err.migration(), Some("second"));
        assert_eq!(table_count(&conn, "a"), 0);
        assert!(!table_exists(&conn).unwrap());
    }

    #[test]
    fn test_execute_migrations_per_migration_keeps_prefix() {
        let mut conn = Connection::open_in_memory().unwrap();
        let order = vec!["first".to_string(), "second".to_string()];

        let result =
            execute_migrations(&mut conn, &failing_pair(), &order, CommitMode::PerMigration);

        assert!(result.is_err());
        assert_eq!(table_count(&conn, "a"), 1);
        let recorded: Vec<String> = applied_names(&conn).unwrap().into_iter().collect();
        assert_eq!(recorded, vec!["first"]);
    }
}
