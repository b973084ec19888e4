//! Migration runner
//!
//! Reads what `schema_version` already records, verifies those migrations
//! against the embedded SQL, then applies the rest in order, each in its
//! own transaction.

#![allow(clippy::result_large_err)]

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use tracing::info;

/// Bring the database schema up to date
///
/// # Errors
///
/// `ChecksumMismatch` if an applied migration differs from the embedded
/// one, `Persistence` if a pending migration fails (its transaction is
/// rolled back).
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        );",
    )
    .map_err(from_rusqlite)?;

    let recorded = recorded_checksums(conn)?;

    for migration in get_migrations() {
        let checksum = compute_checksum(migration.sql);
        match recorded.get(migration.id) {
            Some(Some(applied)) if *applied != checksum => {
                return Err(checksum_mismatch(migration.id, applied, &checksum));
            }
            Some(_) => continue,
            None => run_pending(conn, &migration, &checksum)?,
        }
    }

    Ok(())
}

/// Ids of applied migrations in application order
///
/// # Errors
///
/// `Persistence` if `schema_version` cannot be read.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT migration_id FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;

    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(from_rusqlite)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(from_rusqlite)
}

/// migration_id -> recorded checksum (NULL for rows written without one)
fn recorded_checksums(conn: &Connection) -> Result<HashMap<String, Option<String>>> {
    let mut stmt = conn
        .prepare("SELECT migration_id, checksum FROM schema_version")
        .map_err(from_rusqlite)?;

    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?;

    rows.collect::<rusqlite::Result<HashMap<_, _>>>()
        .map_err(from_rusqlite)
}

fn run_pending(conn: &mut Connection, migration: &Migration, checksum: &str) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        params![migration.id, chrono::Utc::now().timestamp(), checksum],
    )
    .map_err(|e| migration_error(migration.id, &e.to_string()))?;

    tx.commit()
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;

    info!(migration_id = migration.id, "applied migration");
    Ok(())
}
