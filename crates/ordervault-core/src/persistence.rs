//! Persistence port for order aggregates.
//!
//! The repository depends on this trait rather than on a concrete database
//! so that its cache-ordering guarantees can be exercised against stores
//! that fail on demand.

use ordervault_core_types::OpContext;

use crate::errors::Result;
use crate::model::Order;

/// Durable store of order aggregates
///
/// Implementations are shared across threads; every call carries the
/// caller's `OpContext` and must abort with a `Cancelled` or
/// `DeadlineExceeded` error once the context is interrupted.
#[allow(clippy::result_large_err)]
pub trait OrderStore: Send + Sync {
    /// Persist the whole aggregate atomically
    ///
    /// Either the order, delivery, payment and all item rows are committed,
    /// or none of them are. Writing an existing uid replaces the aggregate.
    ///
    /// # Errors
    ///
    /// `Persistence` on any database failure (after rollback),
    /// `Cancelled`/`DeadlineExceeded` when interrupted (after rollback).
    fn write(&self, ctx: &OpContext, order: &Order) -> Result<()>;

    /// Reconstruct an aggregate, `Ok(None)` when the uid is unknown
    ///
    /// A missing delivery or payment row is tolerated and leaves that
    /// sub-record at its default value. Item order is not guaranteed.
    ///
    /// # Errors
    ///
    /// `Persistence` on unexpected database failures.
    fn read(&self, ctx: &OpContext, order_uid: &str) -> Result<Option<Order>>;

    /// Up to `quantity` distinct persisted orders, for cache warm-start
    ///
    /// Returning fewer than `quantity` is not an error.
    ///
    /// # Errors
    ///
    /// `Persistence` if the candidate scan itself fails.
    fn sample(&self, ctx: &OpContext, quantity: usize) -> Result<Vec<Order>>;

    /// Release store resources; later calls fail with `Persistence`
    ///
    /// # Errors
    ///
    /// `Persistence` if final housekeeping fails.
    fn close(&self) -> Result<()>;
}
