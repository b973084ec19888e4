//! Database connection management
//!
//! Every store operation opens its own connection; SQLite serialises writers
//! through the busy timeout and WAL lets readers run alongside a writer.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, invalid_dsn, io_error, Result};
use ordervault_core::core_types::OpContext;
use ordervault_core::errors::ExError;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Number of SQLite VM instructions between interruption checks
const PROGRESS_OPS: i32 = 1_000;

/// Resolve a DSN to a database file path
///
/// Accepts a plain path or a `sqlite://` URL.
///
/// # Errors
///
/// `Configuration` for an empty DSN or an in-memory database, which cannot be
/// shared between per-operation connections.
pub fn parse_dsn(dsn: &str) -> Result<PathBuf> {
    let path = dsn.trim();
    let path = path.strip_prefix("sqlite://").unwrap_or(path);

    if path.is_empty() {
        return Err(invalid_dsn("database DSN must not be empty"));
    }
    if path == ":memory:" || path.contains("mode=memory") {
        return Err(invalid_dsn(
            "in-memory databases are not supported; use a file path",
        ));
    }

    Ok(PathBuf::from(path))
}

/// Open a SQLite database at the given path, creating parent directories
///
/// # Errors
///
/// `Io` if the parent directory cannot be created, `Persistence` if SQLite
/// cannot open the file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error("open_store", e))?;
    }
    Connection::open(path).map_err(from_rusqlite)
}

/// Configure a connection: busy timeout, foreign keys and WAL
///
/// # Errors
///
/// `Persistence` if a pragma is rejected.
pub fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
    conn.busy_timeout(busy_timeout).map_err(from_rusqlite)?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(from_rusqlite)?;

    // journal_mode returns the resulting mode as a row
    let _mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .map_err(from_rusqlite)?;

    Ok(())
}

/// Abort running statements once `ctx` is cancelled or past its deadline
///
/// The aborted statement fails with `SQLITE_INTERRUPT`, which
/// [`crate::errors::store_error`] maps back to the interruption kind.
pub fn install_interrupt(conn: &Connection, ctx: &OpContext) {
    let token = ctx.cancellation().clone();
    let deadline = ctx.deadline();
    conn.progress_handler(
        PROGRESS_OPS,
        Some(move || {
            token.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d)
        }),
    );
}

/// Fail fast when `ctx` is already interrupted
///
/// # Errors
///
/// `Cancelled` or `DeadlineExceeded`.
pub fn checkpoint(ctx: &OpContext, op: &str) -> Result<()> {
    match ctx.interrupted() {
        Some(interrupt) => {
            Err(ExError::interrupted(interrupt, op).with_request_id(ctx.request_id.clone()))
        }
        None => Ok(()),
    }
}
