//! OrderVault Engine - cache-aside order repository
//!
//! Coordinates the in-memory LRU cache from `ordervault-core` with the SQLite
//! store from `ordervault-store`:
//! - reads check the cache, then the store, then backfill the cache
//! - writes commit to the store before they reach the cache
//! - startup warms the cache from a sample of persisted orders

pub mod config;
pub mod repository;

pub use config::{RepositoryConfig, WarmStart};
pub use repository::OrderRepository;
