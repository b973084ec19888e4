//! Hydration layer - rebuilds order aggregates from SQLite rows
//!
//! The order row is authoritative: without it there is no order. Delivery
//! and payment rows are optional and default when absent. Items come back
//! in insertion order.

#![allow(clippy::result_large_err)]

use crate::errors::{store_error, Result};
use chrono::{DateTime, Utc};
use ordervault_core::core_types::OpContext;
use ordervault_core::{Delivery, Item, Order, Payment};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};

/// Operation name reported by read errors
pub const OP_READ: &str = "read_order";

/// Operation name reported by sample errors
pub const OP_SAMPLE: &str = "sample_orders";

/// How warm-start candidates are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleOrder {
    /// Newest `date_created` first
    #[default]
    MostRecent,
    /// Whatever order the database yields
    Unordered,
}

/// Load a single order aggregate, `None` when the order row is absent
pub fn load_order(conn: &Connection, ctx: &OpContext, order_uid: &str) -> Result<Option<Order>> {
    let map_err = |e| store_error(ctx, OP_READ, e).with_order_uid(order_uid);

    let order = conn
        .query_row(
            "SELECT order_uid, track_number, entry, locale, internal_signature, customer_id,
                    delivery_service, shardkey, sm_id, date_created, oof_shard
             FROM orders WHERE order_uid = ?",
            [order_uid],
            order_from_row,
        )
        .optional()
        .map_err(map_err)?;

    let Some(mut order) = order else {
        return Ok(None);
    };

    if let Some(delivery) = conn
        .query_row(
            "SELECT name, phone, zip, city, address, region, email
             FROM deliveries WHERE order_uid = ?",
            [order_uid],
            |row| {
                Ok(Delivery {
                    name: row.get(0)?,
                    phone: row.get(1)?,
                    zip: row.get(2)?,
                    city: row.get(3)?,
                    address: row.get(4)?,
                    region: row.get(5)?,
                    email: row.get(6)?,
                })
            },
        )
        .optional()
        .map_err(map_err)?
    {
        order.delivery = delivery;
    }

    if let Some(payment) = conn
        .query_row(
            "SELECT transaction_id, request_id, currency, provider, amount, payment_dt, bank,
                    delivery_cost, goods_total, custom_fee
             FROM payments WHERE order_uid = ?",
            [order_uid],
            |row| {
                Ok(Payment {
                    transaction_id: row.get(0)?,
                    request_id: row.get(1)?,
                    currency: row.get(2)?,
                    provider: row.get(3)?,
                    amount: row.get(4)?,
                    payment_dt: row.get(5)?,
                    bank: row.get(6)?,
                    delivery_cost: row.get(7)?,
                    goods_total: row.get(8)?,
                    custom_fee: row.get(9)?,
                })
            },
        )
        .optional()
        .map_err(map_err)?
    {
        order.payment = payment;
    }

    let mut stmt = conn
        .prepare_cached(
            "SELECT chrt_id, track_number, price, rid, name, sale, size, total_price, nm_id,
                    brand, status
             FROM items WHERE order_uid = ? ORDER BY id",
        )
        .map_err(map_err)?;

    order.items = stmt
        .query_map([order_uid], |row| {
            Ok(Item {
                chrt_id: row.get(0)?,
                track_number: row.get(1)?,
                price: row.get(2)?,
                rid: row.get(3)?,
                name: row.get(4)?,
                sale: row.get(5)?,
                size: row.get(6)?,
                total_price: row.get(7)?,
                nm_id: row.get(8)?,
                brand: row.get(9)?,
                status: row.get(10)?,
            })
        })
        .map_err(map_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_err)?;

    Ok(Some(order))
}

/// Up to `limit` order uids chosen per `sample_order`
///
/// `order_uid` is the primary key, so the uids are distinct.
pub fn sample_uids(
    conn: &Connection,
    ctx: &OpContext,
    limit: usize,
    sample_order: SampleOrder,
) -> Result<Vec<String>> {
    let sql = match sample_order {
        SampleOrder::MostRecent => {
            "SELECT order_uid FROM orders ORDER BY date_created DESC, order_uid LIMIT ?"
        }
        SampleOrder::Unordered => "SELECT order_uid FROM orders LIMIT ?",
    };
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| store_error(ctx, OP_SAMPLE, e))?;

    let uids = stmt
        .query_map([limit], |row| row.get(0))
        .map_err(|e| store_error(ctx, OP_SAMPLE, e))?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(|e| store_error(ctx, OP_SAMPLE, e))?;

    Ok(uids)
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let date_created: String = row.get(9)?;
    let date_created = DateTime::parse_from_rfc3339(&date_created)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    let mut order = Order::new(row.get::<_, String>(0)?);
    order.track_number = row.get(1)?;
    order.entry = row.get(2)?;
    order.locale = row.get(3)?;
    order.internal_signature = row.get(4)?;
    order.customer_id = row.get(5)?;
    order.delivery_service = row.get(6)?;
    order.shardkey = row.get(7)?;
    order.sm_id = row.get(8)?;
    order.date_created = date_created;
    order.oof_shard = row.get(10)?;

    Ok(order)
}
