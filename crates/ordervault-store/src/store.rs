//! SQLite-backed implementation of the order persistence port

#![allow(clippy::result_large_err)]

use crate::db::{checkpoint, configure, install_interrupt, open, parse_dsn};
use crate::errors::{from_rusqlite, store_closed, store_error, Result};
use crate::migrations::apply_migrations;
use crate::repo::hydration::{load_order, sample_uids, SampleOrder, OP_READ, OP_SAMPLE};
use crate::repo::sqlite_repo::{SqliteRepo, OP_WRITE};
use ordervault_core::core_types::OpContext;
use ordervault_core::{validate_order, ExError, Order, OrderStore};
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const OP_OPEN: &str = "open_store";
const OP_CLOSE: &str = "close_store";

/// Connection settings for [`SqliteOrderStore`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long a connection waits on a locked database
    pub busy_timeout: Duration,
    /// Candidate ordering used by `sample`
    pub sample_order: SampleOrder,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5_000),
            sample_order: SampleOrder::MostRecent,
        }
    }
}

/// Order store over a single SQLite database file
///
/// Opens one connection per operation, so a store is freely shared between
/// threads.
#[derive(Debug)]
pub struct SqliteOrderStore {
    path: PathBuf,
    options: StoreOptions,
    closed: AtomicBool,
}

impl SqliteOrderStore {
    /// Open (creating if needed) the database named by `dsn` and migrate it
    ///
    /// # Errors
    ///
    /// `Configuration` for an unusable DSN, `Persistence` or
    /// `ChecksumMismatch` if the database cannot be opened or migrated.
    pub fn open(dsn: &str, options: StoreOptions) -> Result<Self> {
        let path = parse_dsn(dsn)?;
        Self::open_path(path, options)
    }

    /// Open the database at `path` and migrate it
    ///
    /// # Errors
    ///
    /// See [`SqliteOrderStore::open`].
    pub fn open_path(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut conn = open(&path)?;
        configure(&conn, options.busy_timeout).map_err(|e| e.with_op(OP_OPEN))?;
        apply_migrations(&mut conn)?;

        info!(path = %path.display(), "order store opened");

        Ok(Self {
            path,
            options,
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self, op: &str) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(store_closed(op));
        }
        Ok(())
    }

    /// Fresh connection wired to `ctx` for interruption
    fn connect(&self, ctx: &OpContext, op: &str) -> Result<Connection> {
        let conn = open(&self.path).map_err(|e| e.with_op(op))?;
        configure(&conn, self.options.busy_timeout).map_err(|e| e.with_op(op))?;
        install_interrupt(&conn, ctx);
        Ok(conn)
    }
}

impl OrderStore for SqliteOrderStore {
    fn write(&self, ctx: &OpContext, order: &Order) -> Result<()> {
        self.ensure_open(OP_WRITE)?;
        validate_order(order).map_err(ExError::from)?;
        checkpoint(ctx, OP_WRITE)?;

        let mut conn = self.connect(ctx, OP_WRITE)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| store_error(ctx, OP_WRITE, e).with_order_uid(&order.order_uid))?;

        // Dropping `tx` on any early return rolls the whole aggregate back
        SqliteRepo::persist_order_tx(&tx, ctx, order)?;
        checkpoint(ctx, OP_WRITE)?;

        tx.commit()
            .map_err(|e| store_error(ctx, OP_WRITE, e).with_order_uid(&order.order_uid))?;

        debug!(
            order_uid = %order.order_uid,
            item_count = order.items.len(),
            "order aggregate committed"
        );
        Ok(())
    }

    fn read(&self, ctx: &OpContext, order_uid: &str) -> Result<Option<Order>> {
        self.ensure_open(OP_READ)?;
        checkpoint(ctx, OP_READ)?;

        let mut conn = self.connect(ctx, OP_READ)?;
        // One read transaction so all four tables come from the same snapshot
        let tx = conn
            .transaction()
            .map_err(|e| store_error(ctx, OP_READ, e).with_order_uid(order_uid))?;

        let order = load_order(&tx, ctx, order_uid)?;
        tx.commit()
            .map_err(|e| store_error(ctx, OP_READ, e).with_order_uid(order_uid))?;

        Ok(order)
    }

    fn sample(&self, ctx: &OpContext, quantity: usize) -> Result<Vec<Order>> {
        self.ensure_open(OP_SAMPLE)?;
        if quantity == 0 {
            return Ok(Vec::new());
        }
        checkpoint(ctx, OP_SAMPLE)?;

        let mut conn = self.connect(ctx, OP_SAMPLE)?;
        let tx = conn
            .transaction()
            .map_err(|e| store_error(ctx, OP_SAMPLE, e))?;

        let uids = sample_uids(&tx, ctx, quantity, self.options.sample_order)?;

        let mut orders = Vec::with_capacity(uids.len());
        for uid in uids {
            checkpoint(ctx, OP_SAMPLE)?;
            match load_order(&tx, ctx, &uid) {
                Ok(Some(order)) => orders.push(order),
                Ok(None) => {}
                Err(err) if err.is_cancellation() => return Err(err),
                Err(err) => {
                    warn!(order_uid = %uid, error = %err, "skipping unreadable order in sample");
                }
            }
        }

        tx.commit().map_err(|e| store_error(ctx, OP_SAMPLE, e))?;

        Ok(orders)
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let conn = open(&self.path).map_err(|e| e.with_op(OP_CLOSE))?;
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            .map_err(|e| from_rusqlite(e).with_op(OP_CLOSE))?;

        info!(path = %self.path.display(), "order store closed");
        Ok(())
    }
}
