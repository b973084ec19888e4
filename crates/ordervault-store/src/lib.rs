//! OrderVault Store - SQLite persistence for order aggregates
//!
//! Provides:
//! - SQLite schema with migrations framework
//! - Repository layer writing and hydrating the four order tables
//! - `SqliteOrderStore`, the `OrderStore` implementation used by the engine

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod store;

// Re-export key types
pub use errors::Result;
pub use repo::hydration::SampleOrder;
pub use store::{SqliteOrderStore, StoreOptions};
