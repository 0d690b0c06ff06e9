//! Database connection management
//!
//! Opening connections plus the journal-mode and checkpoint pragmas the run
//! coordinator wraps around a batch of migrations.

use crate::errors::{checkpoint_blocked, from_rusqlite, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Current journal mode, lowercased as SQLite reports it
pub fn journal_mode(conn: &Connection) -> Result<String> {
    conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
        .map_err(from_rusqlite)
}

/// Switch to WAL journaling with automatic checkpoints disabled
///
/// Committed work accumulates in the WAL until [`checkpoint_truncate`] runs.
/// Returns the journal mode SQLite actually selected; in-memory databases
/// report `memory`.
pub fn enable_manual_wal(conn: &Connection) -> Result<String> {
    let mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .map_err(from_rusqlite)?;

    conn.pragma_update(None, "wal_autocheckpoint", 0)
        .map_err(from_rusqlite)?;

    Ok(mode)
}

/// Outcome of a `wal_checkpoint(TRUNCATE)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointStats {
    pub wal_frames: i64,
    pub checkpointed_frames: i64,
}

/// Fold the WAL into the main database file and truncate it
///
/// # Errors
/// Fails if another connection kept the checkpoint from completing.
pub fn checkpoint_truncate(conn: &Connection) -> Result<CheckpointStats> {
    let (busy, wal_frames, checkpointed_frames): (i64, i64, i64) = conn
        .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .map_err(from_rusqlite)?;

    if busy != 0 {
        return Err(checkpoint_blocked(wal_frames, checkpointed_frames));
    }

    Ok(CheckpointStats {
        wal_frames,
        checkpointed_frames,
    })
}

/// Restore the default rollback-journal (`DELETE`) mode
pub fn restore_journal_mode(conn: &Connection) -> Result<String> {
    conn.pragma_update_and_check(None, "journal_mode", "DELETE", |row| row.get(0))
        .map_err(from_rusqlite)
}
