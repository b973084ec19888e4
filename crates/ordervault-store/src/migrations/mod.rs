//! Schema migrations
//!
//! SQL files under `migrations/` are compiled into the binary and applied
//! when a store is opened. `schema_version` records each applied file with
//! the SHA-256 of its SQL.

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
