//! Fixed-capacity LRU cache of order aggregates
//!
//! The cache is a plain single-owner structure; callers that share it across
//! threads wrap it in one mutex (see the repository in `ordervault-engine`).

mod lru;
mod metrics;

pub use lru::OrderCache;
pub use metrics::{CacheMetrics, CacheStats};
