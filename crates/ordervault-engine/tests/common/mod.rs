//! Shared fixtures for repository tests

#![allow(dead_code)]

use ordervault_core::core_types::OpContext;
use ordervault_core::{Delivery, ExError, ExErrorKind, Item, Order, OrderStore, Payment, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn full_order(uid: &str) -> Order {
    let mut order = Order::new(uid);
    order.track_number = "WBILMTESTTRACK".to_string();
    order.entry = "WBIL".to_string();
    order.locale = "en".to_string();
    order.customer_id = "test".to_string();
    order.delivery_service = "meest".to_string();
    order.shardkey = "9".to_string();
    order.sm_id = 99;
    order.oof_shard = "1".to_string();
    order.delivery = Delivery {
        name: "Test Testov".to_string(),
        phone: "+9720000000".to_string(),
        zip: "2639809".to_string(),
        city: "Kiryat Mozkin".to_string(),
        address: "Ploshad Mira 15".to_string(),
        region: "Kraiot".to_string(),
        email: "test@gmail.com".to_string(),
    };
    order.payment = Payment {
        transaction_id: uid.to_string(),
        currency: "USD".to_string(),
        provider: "wbpay".to_string(),
        payment_dt: 1_637_907_727,
        bank: "alpha".to_string(),
        delivery_cost: 1500.0,
        ..Payment::default()
    };
    order.items = vec![
        Item {
            chrt_id: 9_934_930,
            track_number: "WBILMTESTTRACK".to_string(),
            price: 453,
            rid: "ab4219087a764ae0btest".to_string(),
            name: "Mascaras".to_string(),
            sale: 30,
            size: "0".to_string(),
            nm_id: 2_389_212,
            brand: "Vivienne Sabo".to_string(),
            status: 202,
            ..Item::default()
        }
        .with_quantity(1),
        Item {
            chrt_id: 9_934_931,
            track_number: "WBILMTESTTRACK".to_string(),
            price: 200,
            rid: "ab4219087a764ae0btest2".to_string(),
            name: "Lipstick".to_string(),
            size: "0".to_string(),
            nm_id: 2_389_213,
            brand: "Vivienne Sabo".to_string(),
            status: 202,
            ..Item::default()
        }
        .with_quantity(2),
    ];
    order.reconcile_payment();
    order
}

/// In-memory store whose calls can be made to fail, counting every call
#[derive(Default)]
pub struct ScriptedStore {
    orders: Mutex<BTreeMap<String, Order>>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
    pub fail_sample: AtomicBool,
    pub writes: AtomicUsize,
    pub reads: AtomicUsize,
    pub closed: AtomicBool,
}

impl ScriptedStore {
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let store = Self::default();
        {
            let mut map = store.orders.lock().unwrap();
            for order in orders {
                map.insert(order.order_uid.clone(), order);
            }
        }
        store
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self, order_uid: &str) -> Option<Order> {
        self.orders.lock().unwrap().get(order_uid).cloned()
    }

    fn fail(op: &str) -> ExError {
        ExError::new(ExErrorKind::Persistence)
            .with_op(op)
            .with_message("scripted failure")
    }
}

impl OrderStore for ScriptedStore {
    fn write(&self, ctx: &OpContext, order: &Order) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(interrupt) = ctx.interrupted() {
            return Err(ExError::interrupted(interrupt, "write_order"));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::fail("write_order"));
        }
        self.orders
            .lock()
            .unwrap()
            .insert(order.order_uid.clone(), order.clone());
        Ok(())
    }

    fn read(&self, _ctx: &OpContext, order_uid: &str) -> Result<Option<Order>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::fail("read_order"));
        }
        Ok(self.stored(order_uid))
    }

    fn sample(&self, _ctx: &OpContext, quantity: usize) -> Result<Vec<Order>> {
        if self.fail_sample.load(Ordering::SeqCst) {
            return Err(Self::fail("sample_orders"));
        }
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .take(quantity)
            .cloned()
            .collect())
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
