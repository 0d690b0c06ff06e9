//! Error handling for litemigrate-store
//!
//! Wraps litemigrate-core ExError with store-specific helpers

use litemigrate_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an error for a checkpoint that could not complete
pub fn checkpoint_blocked(wal_frames: i64, checkpointed: i64) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("wal_checkpoint")
        .with_message(format!(
            "Checkpoint blocked by another connection: {} of {} WAL frames checkpointed",
            checkpointed, wal_frames
        ))
}
