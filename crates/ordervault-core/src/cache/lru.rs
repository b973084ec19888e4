//! LRU eviction over a linked hash map.
//!
//! Front of the map is the least recently used entry, back the most recently
//! used. `get_refresh` moves a hit to the back and `insert` of an existing
//! key replaces the value and moves it to the back, so both promotion and
//! eviction (`pop_front`) are O(1).

use std::sync::Arc;

use linked_hash_map::LinkedHashMap;
use tracing::debug;

use super::metrics::{CacheMetrics, CacheStats};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::Order;

/// Fixed-capacity order cache with least-recently-used eviction
///
/// Holds at most `capacity` aggregates. Never performs I/O and never fails
/// after construction: absence is reported as `None`.
#[derive(Debug)]
pub struct OrderCache {
    capacity: usize,
    entries: LinkedHashMap<String, Arc<Order>>,
    generation: u64,
    metrics: CacheMetrics,
}

impl OrderCache {
    /// Create an empty cache holding at most `capacity` orders
    ///
    /// # Errors
    /// Returns `InvalidInput` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("create_cache")
                .with_message("cache capacity must be at least 1"));
        }

        Ok(Self {
            capacity,
            entries: LinkedHashMap::with_capacity(capacity + 1),
            generation: 0,
            metrics: CacheMetrics::new(),
        })
    }

    /// Insert or refresh an order, making it the most recently used
    ///
    /// If this pushes the cache over capacity, exactly one entry (the least
    /// recently used) is evicted and its uid returned.
    ///
    /// Every put advances the write generation.
    pub fn put(&mut self, order: Arc<Order>) -> Option<String> {
        let uid = order.order_uid.clone();
        self.entries.insert(uid, order);
        self.generation = self.generation.wrapping_add(1);
        self.metrics.record_insert();

        if self.entries.len() <= self.capacity {
            return None;
        }

        let (evicted_uid, _) = self.entries.pop_front()?;
        self.metrics.record_eviction();
        debug!(
            order_uid = %evicted_uid,
            cache_len = self.entries.len(),
            "evicted least recently used order"
        );
        Some(evicted_uid)
    }

    /// Look up an order, promoting it to most recently used on a hit
    ///
    /// A miss has no side effect on the entries.
    pub fn get(&mut self, order_uid: &str) -> Option<Arc<Order>> {
        match self.entries.get_refresh(order_uid) {
            Some(order) => {
                self.metrics.record_hit();
                Some(Arc::clone(order))
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Counter advanced by every `put`
    ///
    /// A reader records it on a miss and hands it back to `backfill`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cache a store read taken after a miss at `generation`
    ///
    /// Refused when any put happened since the miss: the read may predate a
    /// committed write whose cached copy has since been replaced or evicted.
    /// Returns whether the order was cached.
    pub fn backfill(&mut self, order: Arc<Order>, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.put(order);
        true
    }

    /// Look up without promotion
    pub fn peek(&self, order_uid: &str) -> Option<&Arc<Order>> {
        self.entries.get(order_uid)
    }

    pub fn contains(&self, order_uid: &str) -> bool {
        self.entries.contains_key(order_uid)
    }

    /// Cached uids from least to most recently used
    pub fn keys_lru_order(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.entries.len(), self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(uid: &str) -> Arc<Order> {
        Arc::new(Order::new(uid))
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = OrderCache::new(0).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_insert_without_reads_evicts_oldest() {
        let mut cache = OrderCache::new(2).unwrap();
        assert_eq!(cache.put(order("A")), None);
        assert_eq!(cache.put(order("B")), None);
        assert_eq!(cache.put(order("C")), Some("A".to_string()));

        assert_eq!(cache.keys_lru_order(), vec!["B", "C"]);
    }

    #[test]
    fn test_read_promotes_entry() {
        let mut cache = OrderCache::new(2).unwrap();
        cache.put(order("A"));
        cache.put(order("B"));
        assert!(cache.get("A").is_some());

        assert_eq!(cache.put(order("C")), Some("B".to_string()));
        assert!(cache.contains("A"));
        assert!(cache.contains("C"));
        assert!(!cache.contains("B"));
    }

    #[test]
    fn test_reinsert_replaces_value_and_promotes() {
        let mut cache = OrderCache::new(2).unwrap();
        cache.put(order("A"));
        cache.put(order("B"));

        let mut refreshed = Order::new("A");
        refreshed.track_number = "WBILMTESTTRACK".to_string();
        assert_eq!(cache.put(Arc::new(refreshed)), None);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.keys_lru_order(), vec!["B", "A"]);
        assert_eq!(
            cache.peek("A").map(|o| o.track_number.as_str()),
            Some("WBILMTESTTRACK")
        );
    }

    #[test]
    fn test_miss_has_no_side_effect() {
        let mut cache = OrderCache::new(3).unwrap();
        cache.put(order("A"));
        cache.put(order("B"));
        let before = cache.keys_lru_order();

        assert!(cache.get("missing").is_none());

        assert_eq!(cache.keys_lru_order(), before);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_peek_does_not_promote() {
        let mut cache = OrderCache::new(2).unwrap();
        cache.put(order("A"));
        cache.put(order("B"));
        assert!(cache.peek("A").is_some());

        assert_eq!(cache.put(order("C")), Some("A".to_string()));
    }

    #[test]
    fn test_backfill_at_current_generation_is_cached() {
        let mut cache = OrderCache::new(2).unwrap();
        cache.put(order("A"));
        assert!(cache.get("B").is_none());
        let seen = cache.generation();

        assert!(cache.backfill(order("B"), seen));
        assert_eq!(cache.keys_lru_order(), vec!["A", "B"]);
        assert!(cache.generation() > seen);
    }

    #[test]
    fn test_backfill_after_put_and_eviction_is_refused() {
        let mut cache = OrderCache::new(1).unwrap();
        assert!(cache.get("A").is_none());
        let seen = cache.generation();

        let mut newer = Order::new("A");
        newer.track_number = "NEWER".to_string();
        cache.put(Arc::new(newer));
        cache.put(order("B"));

        assert!(!cache.backfill(order("A"), seen));
        assert!(!cache.contains("A"));
        assert_eq!(cache.keys_lru_order(), vec!["B"]);
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = OrderCache::new(1).unwrap();
        cache.put(order("A"));
        assert_eq!(cache.put(order("B")), Some("A".to_string()));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("B").is_some());
    }

    #[test]
    fn test_stats_track_operations() {
        let mut cache = OrderCache::new(1).unwrap();
        cache.put(order("A"));
        cache.put(order("B"));
        cache.get("B");
        cache.get("A");

        let stats = cache.stats();
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.len, 1);
        assert_eq!(stats.capacity, 1);
    }
}
