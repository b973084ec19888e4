//! Cache-aside order repository
//!
//! ## Ordering
//!
//! - `insert` writes to the store first and caches only after the commit,
//!   so the cache never holds an aggregate that failed to persist.
//! - `find` serves hits from the cache; a miss reads the store and backfills
//!   the cache, unless the cache was written while the store read was in
//!   flight. Not-found is never cached.
//!
//! ## Locking
//!
//! One mutex guards the cache and is held only for in-memory cache calls,
//! never across store I/O.
//!
//! ## Logging Ownership
//!
//! The repository owns lifecycle logging (`log_op_start!`, `log_op_end!`,
//! `log_op_error!`); the cache and store log at debug level only.

#![allow(clippy::result_large_err)]

use crate::config::{RepositoryConfig, WarmStart};
use ordervault_core::core_types::schema::{SOURCE_CACHE, SOURCE_STORE};
use ordervault_core::core_types::OpContext;
use ordervault_core::{
    log_op_end, log_op_error, log_op_start, validate_order, CacheStats, ExError, ExErrorKind,
    Order, OrderCache, OrderError, OrderStore, Result,
};
use ordervault_store::SqliteOrderStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

const OP_INITIALIZE: &str = "initialize_repository";
const OP_FIND: &str = "find_order";
const OP_INSERT: &str = "insert_order";
const OP_WARM_START: &str = "warm_start";

/// Order repository combining an LRU cache with a durable store
///
/// Shared between threads as `Arc<OrderRepository<_>>`.
pub struct OrderRepository<S: OrderStore = SqliteOrderStore> {
    store: S,
    cache: Mutex<OrderCache>,
}

impl OrderRepository<SqliteOrderStore> {
    /// Open the SQLite store named by `config` and warm the cache
    ///
    /// # Errors
    ///
    /// `Configuration` for invalid settings, `Persistence` or
    /// `ChecksumMismatch` if the store cannot be opened. Warm-start failures
    /// are logged and do not fail initialization.
    pub fn open(config: &RepositoryConfig, ctx: &OpContext) -> Result<Self> {
        log_op_start!(OP_INITIALIZE, capacity = config.cache_capacity);
        let start = Instant::now();

        let result = config.validate().and_then(|()| {
            let store = SqliteOrderStore::open(config.dsn.expose(), config.store_options())?;
            Self::with_store(store, config.cache_capacity, config.warm_start, ctx)
        });

        match &result {
            Ok(repo) => {
                log_op_end!(
                    OP_INITIALIZE,
                    duration_ms = start.elapsed().as_millis() as u64,
                    cache_len = repo.cached_len()
                );
            }
            Err(e) => {
                log_op_error!(
                    OP_INITIALIZE,
                    e,
                    duration_ms = start.elapsed().as_millis() as u64
                );
            }
        }

        result
    }
}

impl<S: OrderStore> OrderRepository<S> {
    /// Build a repository over an already opened store
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `capacity` is zero.
    pub fn with_store(
        store: S,
        capacity: usize,
        warm_start: WarmStart,
        ctx: &OpContext,
    ) -> Result<Self> {
        let repo = Self {
            store,
            cache: Mutex::new(OrderCache::new(capacity)?),
        };

        if warm_start != WarmStart::Disabled {
            repo.warm_start(ctx, capacity);
        }

        Ok(repo)
    }

    /// Pre-populate the cache from a store sample
    ///
    /// Sampling failures leave the cache empty; the store stays the source
    /// of truth, so startup carries on.
    fn warm_start(&self, ctx: &OpContext, capacity: usize) {
        let start = Instant::now();

        let sample = match self.store.sample(ctx, capacity) {
            Ok(sample) => sample,
            Err(err) => {
                warn!(
                    op = OP_WARM_START,
                    err.code = err.code(),
                    error = %err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "warm-start failed, starting with an empty cache"
                );
                return;
            }
        };

        let sample_len = sample.len();
        let mut cache = self.lock_cache();
        // Oldest first, so the first sampled order ends up most recently used
        for order in sample.into_iter().rev() {
            cache.put(Arc::new(order));
        }

        info!(
            op = OP_WARM_START,
            sample_len,
            cache_len = cache.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "cache warmed"
        );
    }

    /// Look an order up, cache first
    ///
    /// Returns `Ok(None)` for an unknown uid; nothing is cached in that case.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty uid; store errors propagate unchanged.
    pub fn find(&self, ctx: &OpContext, order_uid: &str) -> Result<Option<Arc<Order>>> {
        log_op_start!(OP_FIND, order_uid = order_uid, request_id = %ctx.request_id);
        let start = Instant::now();

        let result = self.find_impl(ctx, order_uid);

        match &result {
            Ok((order, source)) => {
                log_op_end!(
                    OP_FIND,
                    duration_ms = start.elapsed().as_millis() as u64,
                    order_uid = order_uid,
                    found = order.is_some(),
                    source = *source
                );
            }
            Err(e) => {
                log_op_error!(
                    OP_FIND,
                    e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    order_uid = order_uid
                );
            }
        }

        result.map(|(order, _)| order)
    }

    fn find_impl(
        &self,
        ctx: &OpContext,
        order_uid: &str,
    ) -> Result<(Option<Arc<Order>>, &'static str)> {
        if order_uid.trim().is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op(OP_FIND)
                .with_message("order uid must not be empty"));
        }

        let generation = {
            let mut cache = self.lock_cache();
            if let Some(order) = cache.get(order_uid) {
                debug!(order_uid, "cache hit");
                return Ok((Some(order), SOURCE_CACHE));
            }
            cache.generation()
        };
        debug!(order_uid, "cache miss");

        let Some(order) = self.store.read(ctx, order_uid)? else {
            return Ok((None, SOURCE_STORE));
        };

        let order = Arc::new(order);
        if !self.lock_cache().backfill(Arc::clone(&order), generation) {
            debug!(order_uid, "cache written during read, skipping backfill");
        }
        Ok((Some(order), SOURCE_STORE))
    }

    /// Persist an order, then cache it
    ///
    /// Totals that disagree with the items are recomputed (and logged)
    /// before validation. Re-inserting a uid replaces the stored
    /// aggregate and the cached one.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the order fails validation; store errors propagate
    /// unchanged. On any error the cache is left untouched.
    pub fn insert(&self, ctx: &OpContext, order: Order) -> Result<()> {
        log_op_start!(
            OP_INSERT,
            order_uid = %order.order_uid,
            item_count = order.item_count(),
            request_id = %ctx.request_id
        );
        let start = Instant::now();
        let order_uid = order.order_uid.clone();

        let result = self.insert_impl(ctx, order);

        match &result {
            Ok(()) => {
                log_op_end!(
                    OP_INSERT,
                    duration_ms = start.elapsed().as_millis() as u64,
                    order_uid = %order_uid
                );
            }
            Err(e) => {
                log_op_error!(
                    OP_INSERT,
                    e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    order_uid = %order_uid
                );
            }
        }

        result
    }

    fn insert_impl(&self, ctx: &OpContext, mut order: Order) -> Result<()> {
        if let Err(
            mismatch @ (OrderError::GoodsTotalMismatch { .. } | OrderError::AmountMismatch { .. }),
        ) = validate_order(&order)
        {
            order.reconcile_payment();
            warn!(
                op = OP_INSERT,
                order_uid = %order.order_uid,
                reason = %mismatch,
                computed_goods_total = order.payment.goods_total,
                computed_amount = order.payment.amount,
                "payment totals recomputed from items"
            );
        }
        validate_order(&order)?;
        self.store.write(ctx, &order)?;
        self.lock_cache().put(Arc::new(order));
        Ok(())
    }

    /// Snapshot of cache hit, miss and eviction counters
    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    pub fn cached_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Whether `order_uid` is cached, without touching recency
    pub fn is_cached(&self, order_uid: &str) -> bool {
        self.lock_cache().contains(order_uid)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Close the store and drop the cache
    ///
    /// # Errors
    ///
    /// Whatever the store reports while closing.
    pub fn close(self) -> Result<()> {
        let cached = self.cached_len();
        self.store.close()?;
        info!(cache_len = cached, "order repository closed");
        Ok(())
    }

    /// The cache holds no invariant a panicking holder could break, so a
    /// poisoned lock is recovered.
    fn lock_cache(&self) -> MutexGuard<'_, OrderCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
