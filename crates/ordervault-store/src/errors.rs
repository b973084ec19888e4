//! Error handling for ordervault-store
//!
//! Wraps ordervault-core ExError with store-specific helpers

use ordervault_core::errors::{ExError, ExErrorKind};
use ordervault_core::core_types::OpContext;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ChecksumMismatch)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Map a database error raised while serving `ctx`
///
/// When the context has been interrupted the statement was aborted by the
/// progress handler (or would have been), so the interruption is reported
/// instead of the raw SQLite failure.
pub fn store_error(ctx: &OpContext, op: &str, err: rusqlite::Error) -> ExError {
    let base = match ctx.interrupted() {
        Some(interrupt) => ExError::interrupted(interrupt, op),
        None => ExError::new(ExErrorKind::Persistence)
            .with_op(op)
            .with_message(err.to_string()),
    };
    base.with_request_id(ctx.request_id.clone())
}

/// Create the error returned by every call after `close`
pub fn store_closed(op: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op)
        .with_message("order store is closed")
}

/// Create an invalid DSN error
pub fn invalid_dsn(reason: &str) -> ExError {
    ExError::new(ExErrorKind::Configuration)
        .with_op("open_store")
        .with_message(reason.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
