// Integration tests for LRU eviction
// Covers: capacity bound, recency-based eviction, miss without mutation

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use ordervault_core::{Order, OrderCache};
use proptest::prelude::*;

fn order(uid: &str) -> Arc<Order> {
    Arc::new(Order::new(uid))
}

#[test]
fn test_scenario_insert_abc_evicts_a() {
    // Given: capacity 2
    let mut cache = OrderCache::new(2).unwrap();

    // When: A, B, C are inserted with no reads
    cache.put(order("A"));
    cache.put(order("B"));
    cache.put(order("C"));

    // Then: cache holds {B, C}
    assert!(!cache.contains("A"));
    assert!(cache.contains("B"));
    assert!(cache.contains("C"));
}

#[test]
fn test_scenario_read_a_then_insert_c_evicts_b() {
    let mut cache = OrderCache::new(2).unwrap();
    cache.put(order("A"));
    cache.put(order("B"));

    // When: A is read before C is inserted
    assert!(cache.get("A").is_some());
    let evicted = cache.put(order("C"));

    // Then: B, the least recently touched, is evicted
    assert_eq!(evicted.as_deref(), Some("B"));
    assert!(cache.contains("A"));
    assert!(cache.contains("C"));
}

#[test]
fn test_accessed_entry_outlives_newer_untouched_entry() {
    let mut cache = OrderCache::new(3).unwrap();
    cache.put(order("old"));
    cache.put(order("mid"));
    cache.put(order("new"));

    cache.get("old");
    cache.put(order("newer"));

    // "mid" was inserted after "old" but never touched since
    assert!(cache.contains("old"));
    assert!(!cache.contains("mid"));
}

#[test]
fn test_get_returns_shared_aggregate() {
    let mut cache = OrderCache::new(4).unwrap();
    let mut original = Order::new("shared");
    original.locale = "en".to_string();
    let original = Arc::new(original);
    cache.put(Arc::clone(&original));

    let fetched = cache.get("shared").unwrap();
    assert!(Arc::ptr_eq(&original, &fetched));
}

#[derive(Debug, Clone)]
enum Op {
    Put(u8),
    Get(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..12).prop_map(Op::Put),
        (0u8..12).prop_map(Op::Get),
    ]
}

/// Reference recency list: front = least recently used
fn model_touch(model: &mut Vec<String>, key: &str) -> bool {
    match model.iter().position(|k| k == key) {
        Some(pos) => {
            let k = model.remove(pos);
            model.push(k);
            true
        }
        None => false,
    }
}

proptest! {
    #[test]
    fn prop_cache_matches_reference_lru(
        capacity in 1usize..8,
        ops in proptest::collection::vec(op_strategy(), 0..64),
    ) {
        let mut cache = OrderCache::new(capacity).unwrap();
        let mut model: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Put(k) => {
                    let key = format!("order-{}", k);
                    let expected_evicted = if model_touch(&mut model, &key) {
                        None
                    } else {
                        model.push(key.clone());
                        if model.len() > capacity { Some(model.remove(0)) } else { None }
                    };
                    let evicted = cache.put(order(&key));
                    prop_assert_eq!(evicted, expected_evicted);
                }
                Op::Get(k) => {
                    let key = format!("order-{}", k);
                    let expected_hit = model_touch(&mut model, &key);
                    let hit = cache.get(&key).is_some();
                    prop_assert_eq!(hit, expected_hit);
                }
            }

            prop_assert!(cache.len() <= capacity);
            prop_assert_eq!(cache.keys_lru_order(), model.clone());
        }
    }

    #[test]
    fn prop_capacity_plus_one_distinct_evicts_first(capacity in 1usize..16) {
        let mut cache = OrderCache::new(capacity).unwrap();
        for i in 0..=capacity {
            cache.put(order(&format!("o{}", i)));
        }

        prop_assert_eq!(cache.len(), capacity);
        prop_assert!(!cache.contains("o0"));
        for i in 1..=capacity {
            let uid = format!("o{}", i);
            prop_assert!(cache.contains(&uid));
        }
    }
}
