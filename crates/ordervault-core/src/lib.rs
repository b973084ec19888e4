//! OrderVault Core - order aggregate model and in-memory cache
//!
//! This crate provides:
//! - The Order aggregate (Order, Delivery, Payment, Item) and its validation rules
//! - The fixed-capacity LRU `OrderCache`
//! - The `OrderStore` persistence port implemented by `ordervault-store`
//! - The canonical error facility (`ExError`, `ExErrorKind`)
//! - The structured logging facility and its macros

pub mod cache;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod persistence;
pub mod rules;

/// Re-exported so the logging macros resolve schema constants through `$crate`
pub use ordervault_core_types as core_types;

pub use cache::{CacheStats, OrderCache};
pub use errors::{ExError, ExErrorKind, OrderError, Result};
pub use model::{Delivery, Item, Order, Payment};
pub use persistence::OrderStore;
pub use rules::validate_order;
