//! SQLite repository implementation
//!
//! Writes one order aggregate into orders, deliveries, payments and items.
//! Callers run these inside a single transaction; nothing here commits.

#![allow(clippy::result_large_err)]

use crate::db::checkpoint;
use crate::errors::{store_error, Result};
use chrono::SecondsFormat;
use ordervault_core::core_types::OpContext;
use ordervault_core::{Delivery, Item, Order, Payment};
use rusqlite::Connection;

/// Operation name reported by write errors
pub const OP_WRITE: &str = "write_order";

/// SQLite repository for order aggregates
pub struct SqliteRepo;

impl SqliteRepo {
    /// Upsert every row of the aggregate, replacing its items
    ///
    /// The context is checked between statements so an interrupted write
    /// stops early and leaves the enclosing transaction to roll back.
    pub fn persist_order_tx(conn: &Connection, ctx: &OpContext, order: &Order) -> Result<()> {
        Self::persist_order_row(conn, ctx, order)?;
        checkpoint(ctx, OP_WRITE)?;

        Self::persist_delivery(conn, ctx, &order.order_uid, &order.delivery)?;
        checkpoint(ctx, OP_WRITE)?;

        Self::persist_payment(conn, ctx, &order.order_uid, &order.payment)?;
        checkpoint(ctx, OP_WRITE)?;

        Self::replace_items(conn, ctx, &order.order_uid, &order.items)
    }

    fn persist_order_row(conn: &Connection, ctx: &OpContext, order: &Order) -> Result<()> {
        conn.execute(
            "INSERT INTO orders (order_uid, track_number, entry, locale, internal_signature,
                                 customer_id, delivery_service, shardkey, sm_id, date_created, oof_shard)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(order_uid) DO UPDATE SET
                track_number = excluded.track_number,
                entry = excluded.entry,
                locale = excluded.locale,
                internal_signature = excluded.internal_signature,
                customer_id = excluded.customer_id,
                delivery_service = excluded.delivery_service,
                shardkey = excluded.shardkey,
                sm_id = excluded.sm_id,
                date_created = excluded.date_created,
                oof_shard = excluded.oof_shard",
            rusqlite::params![
                order.order_uid,
                order.track_number,
                order.entry,
                order.locale,
                order.internal_signature,
                order.customer_id,
                order.delivery_service,
                order.shardkey,
                order.sm_id,
                order
                    .date_created
                    .to_rfc3339_opts(SecondsFormat::Nanos, true),
                order.oof_shard,
            ],
        )
        .map_err(|e| store_error(ctx, OP_WRITE, e).with_order_uid(&order.order_uid))?;

        Ok(())
    }

    fn persist_delivery(
        conn: &Connection,
        ctx: &OpContext,
        order_uid: &str,
        delivery: &Delivery,
    ) -> Result<()> {
        conn.execute(
            "INSERT INTO deliveries (order_uid, name, phone, zip, city, address, region, email)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(order_uid) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                zip = excluded.zip,
                city = excluded.city,
                address = excluded.address,
                region = excluded.region,
                email = excluded.email",
            rusqlite::params![
                order_uid,
                delivery.name,
                delivery.phone,
                delivery.zip,
                delivery.city,
                delivery.address,
                delivery.region,
                delivery.email,
            ],
        )
        .map_err(|e| store_error(ctx, OP_WRITE, e).with_order_uid(order_uid))?;

        Ok(())
    }

    fn persist_payment(
        conn: &Connection,
        ctx: &OpContext,
        order_uid: &str,
        payment: &Payment,
    ) -> Result<()> {
        conn.execute(
            "INSERT INTO payments (order_uid, transaction_id, request_id, currency, provider, amount,
                                   payment_dt, bank, delivery_cost, goods_total, custom_fee)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(order_uid) DO UPDATE SET
                transaction_id = excluded.transaction_id,
                request_id = excluded.request_id,
                currency = excluded.currency,
                provider = excluded.provider,
                amount = excluded.amount,
                payment_dt = excluded.payment_dt,
                bank = excluded.bank,
                delivery_cost = excluded.delivery_cost,
                goods_total = excluded.goods_total,
                custom_fee = excluded.custom_fee",
            rusqlite::params![
                order_uid,
                payment.transaction_id,
                payment.request_id,
                payment.currency,
                payment.provider,
                payment.amount,
                payment.payment_dt,
                payment.bank,
                payment.delivery_cost,
                payment.goods_total,
                payment.custom_fee,
            ],
        )
        .map_err(|e| store_error(ctx, OP_WRITE, e).with_order_uid(order_uid))?;

        Ok(())
    }

    /// Delete the order's previous items and insert the current ones
    ///
    /// Re-inserting the same order therefore never duplicates item rows.
    fn replace_items(
        conn: &Connection,
        ctx: &OpContext,
        order_uid: &str,
        items: &[Item],
    ) -> Result<()> {
        conn.execute("DELETE FROM items WHERE order_uid = ?1", [order_uid])
            .map_err(|e| store_error(ctx, OP_WRITE, e).with_order_uid(order_uid))?;

        let mut stmt = conn
            .prepare_cached(
                "INSERT INTO items (order_uid, chrt_id, track_number, price, rid, name, sale,
                                    size, total_price, nm_id, brand, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )
            .map_err(|e| store_error(ctx, OP_WRITE, e).with_order_uid(order_uid))?;

        for item in items {
            checkpoint(ctx, OP_WRITE)?;
            stmt.execute(rusqlite::params![
                order_uid,
                item.chrt_id,
                item.track_number,
                item.price,
                item.rid,
                item.name,
                item.sale,
                item.size,
                item.total_price,
                item.nm_id,
                item.brand,
                item.status,
            ])
            .map_err(|e| store_error(ctx, OP_WRITE, e).with_order_uid(order_uid))?;
        }

        Ok(())
    }
}
