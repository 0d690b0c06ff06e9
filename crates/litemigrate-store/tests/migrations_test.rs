#![allow(clippy::unwrap_used, clippy::expect_used)]

// Integration tests for the execution engine and run coordinator

use std::cell::RefCell;
use std::rc::Rc;

use litemigrate_core::{Migration, Target};
use litemigrate_store::migrations::bookkeeping::{applied_names, list_applied, LM_MIGRATIONS_TABLE};
use litemigrate_store::{db, CommitMode, MigrationRun, RunOptions, RunState, SqliteMigrationSet};
use rusqlite::Connection;
use tempfile::TempDir;

fn schema_set() -> SqliteMigrationSet {
    SqliteMigrationSet::from_migrations(vec![
        Migration::new("0001_initial")
            .up_sql("CREATE TABLE accounts (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
            .down_sql("DROP TABLE accounts"),
        Migration::new("0002_users")
            .depends_on("0001_initial")
            .up_sql("CREATE TABLE users (id INTEGER PRIMARY KEY, account_id INTEGER REFERENCES accounts(id))")
            .down_sql("DROP TABLE users"),
        Migration::new("0003_seed")
            .depends_on("0002_users")
            .up_sql("INSERT INTO accounts (id, name) VALUES (1, 'root')")
            .up_sql("INSERT INTO users (id, account_id) VALUES (1, 1)"),
    ])
    .unwrap()
}

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap();

    let tables = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();

    tables
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty database file
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("store.db");

    // When: Migrations are applied
    let mut run = MigrationRun::open(&db_path).unwrap();
    let report = run.execute(&schema_set(), &RunOptions::default()).unwrap();

    // Then: All migrations ran in dependency order
    assert_eq!(report.applied, vec!["0001_initial", "0002_users", "0003_seed"]);
    assert_eq!(run.state(), RunState::NormalMode);

    // And: The schema and bookkeeping rows exist
    let conn = run.into_connection();
    assert_eq!(
        table_names(&conn),
        vec![LM_MIGRATIONS_TABLE, "accounts", "users"]
    );
    assert_eq!(applied_names(&conn).unwrap().len(), 3);

    // And: The database is back in rollback-journal mode
    assert_eq!(db::journal_mode(&conn).unwrap(), "delete");
}

#[test]
fn test_migration_idempotency() {
    // Given: A database with migrations already applied
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("store.db");
    MigrationRun::open(&db_path)
        .unwrap()
        .execute(&schema_set(), &RunOptions::default())
        .unwrap();

    // When: Migrations are re-run
    let report = MigrationRun::open(&db_path)
        .unwrap()
        .execute(&schema_set(), &RunOptions::default())
        .unwrap();

    // Then: Nothing is re-applied
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped.len(), 3);

    let conn = Connection::open(&db_path).unwrap();
    let users: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 1, "Seed rows must not be duplicated");
}

#[test]
fn test_replay_all_reapplies_recorded_migrations() {
    let set = SqliteMigrationSet::from_migrations(vec![Migration::new("0001_initial")
        .up_sql("CREATE TABLE IF NOT EXISTS accounts (id INTEGER PRIMARY KEY)")])
    .unwrap();
    let mut conn = db::open_in_memory().unwrap();

    for _ in 0..2 {
        let mut run = MigrationRun::from_connection(conn);
        let report = run
            .execute(
                &set,
                &RunOptions {
                    skip_applied: false,
                    ..RunOptions::default()
                },
            )
            .unwrap();
        assert_eq!(report.applied, vec!["0001_initial"]);
        conn = run.into_connection();
    }

    assert_eq!(list_applied(&conn).unwrap().len(), 1);
}

#[test]
fn test_steps_apply_in_listed_order() {
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let (a, b, c) = (log.clone(), log.clone(), log.clone());

    let set = SqliteMigrationSet::from_migrations(vec![Migration::new("ordered")
        .up_fn("A", move |conn: &Connection| {
            a.borrow_mut().push("A");
            conn.execute_batch("CREATE TABLE t (v TEXT)")?;
            Ok(())
        })
        .up_fn("B", move |conn: &Connection| {
            b.borrow_mut().push("B");
            conn.execute("INSERT INTO t VALUES ('b')", [])?;
            Ok(())
        })
        .up_fn("C", move |conn: &Connection| {
            c.borrow_mut().push("C");
            conn.execute("INSERT INTO t VALUES ('c')", [])?;
            Ok(())
        })])
    .unwrap();

    let mut run = MigrationRun::open_in_memory().unwrap();
    run.execute(&set, &RunOptions::default()).unwrap();

    assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
    let rows: i64 = run
        .connection()
        .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn test_failed_step_undoes_its_migration() {
    // Given: A migration whose third step fails
    let set = SqliteMigrationSet::from_migrations(vec![Migration::new("partial")
        .up_sql("CREATE TABLE a (id INTEGER)")
        .up_sql("INSERT INTO a VALUES (1)")
        .up_sql("INSERT INTO does_not_exist VALUES (1)")])
    .unwrap();

    // When: It runs
    let mut run = MigrationRun::open_in_memory().unwrap();
    let err = run.execute(&set, &RunOptions::default()).unwrap_err();

    // Then: The failure names the migration and step
    assert_eq!(err.code(), "ERR_STEP_FAILED");
    assert_eq!(err.migration(), Some("partial"));
    assert_eq!(err.step(), Some(2));
    assert_eq!(run.state(), RunState::Executing);

    // And: Steps A and B were not kept
    let conn = run.into_connection();
    assert!(!table_names(&conn).contains(&"a".to_string()));
}

#[test]
fn test_named_target_runs_dependency_closure_only() {
    let mut run = MigrationRun::open_in_memory().unwrap();
    let report = run
        .execute(
            &schema_set(),
            &RunOptions {
                target: Target::from("0002_users"),
                ..RunOptions::default()
            },
        )
        .unwrap();

    assert_eq!(report.applied, vec!["0001_initial", "0002_users"]);
    assert_eq!(report.order.len(), 3);

    // A later run to latest picks up the rest
    let conn = run.into_connection();
    let mut run = MigrationRun::from_connection(conn);
    let report = run.execute(&schema_set(), &RunOptions::default()).unwrap();
    assert_eq!(report.applied, vec!["0003_seed"]);
    assert_eq!(report.skipped, vec!["0001_initial", "0002_users"]);
}

#[test]
fn test_unknown_target_fails_before_execution() {
    let mut run = MigrationRun::open_in_memory().unwrap();
    let err = run
        .execute(
            &schema_set(),
            &RunOptions {
                target: Target::from("9999_missing"),
                commit_mode: CommitMode::PerMigration,
                ..RunOptions::default()
            },
        )
        .unwrap_err();

    assert_eq!(err.code(), "ERR_NOT_FOUND");
    let conn = run.into_connection();
    assert_eq!(table_names(&conn), vec![LM_MIGRATIONS_TABLE]);
}

#[test]
fn test_run_report_serializes_for_tooling() {
    let mut run = MigrationRun::open_in_memory().unwrap();
    let report = run
        .execute(
            &schema_set(),
            &RunOptions {
                commit_mode: CommitMode::PerMigration,
                ..RunOptions::default()
            },
        )
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["commit_mode"], "per-migration");
    assert_eq!(json["applied"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["run_id"], run.run_id().to_string());
}
