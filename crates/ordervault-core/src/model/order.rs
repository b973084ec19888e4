use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Delivery, Item, Payment};
use crate::errors::OrderError;

/// Order aggregate root
///
/// The unit of identity, caching and transactional write. An order owns
/// exactly one `Delivery`, exactly one `Payment` and any number of `Item`s;
/// none of them is ever addressed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Globally unique identifier (join key across all four tables)
    pub order_uid: String,
    pub track_number: String,
    /// Entry channel
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<Item>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,
}

impl Order {
    /// Create an order with empty sub-records, created now
    pub fn new(order_uid: impl Into<String>) -> Self {
        Self {
            order_uid: order_uid.into(),
            track_number: String::new(),
            entry: String::new(),
            delivery: Delivery::default(),
            payment: Payment::default(),
            items: Vec::new(),
            locale: String::new(),
            internal_signature: String::new(),
            customer_id: String::new(),
            delivery_service: String::new(),
            shardkey: String::new(),
            sm_id: 0,
            date_created: Utc::now(),
            oof_shard: String::new(),
        }
    }

    /// Decode an order from an incoming JSON event
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Serialization` if the bytes are not a valid order.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, OrderError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Sum of all item totals
    pub fn items_total(&self) -> f64 {
        self.items.iter().map(|item| item.total_price).sum()
    }

    /// Recompute `goods_total` and `amount` from the items and payment components
    pub fn reconcile_payment(&mut self) {
        self.payment.goods_total = self.items_total();
        self.payment.amount = self.payment.expected_amount();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with_items() -> Order {
        let mut order = Order::new("b563feb7b2b84b6test");
        order.payment.delivery_cost = 1500.0;
        order.payment.custom_fee = 10.0;
        order.items = vec![
            Item {
                price: 453,
                sale: 30,
                ..Default::default()
            }
            .with_quantity(1),
            Item {
                price: 1000,
                sale: 0,
                ..Default::default()
            }
            .with_quantity(2),
        ];
        order
    }

    #[test]
    fn test_new_order_is_empty() {
        let order = Order::new("o-1");
        assert_eq!(order.order_uid, "o-1");
        assert!(order.items.is_empty());
        assert_eq!(order.delivery, Delivery::default());
    }

    #[test]
    fn test_reconcile_payment() {
        let mut order = order_with_items();
        order.reconcile_payment();

        let goods = 453.0 * 0.7 + 2000.0;
        assert_eq!(order.payment.goods_total, goods);
        assert_eq!(order.payment.amount, 1500.0 + goods + 10.0);
    }

    #[test]
    fn test_json_round_trip_uses_event_field_names() {
        let mut order = order_with_items();
        order.reconcile_payment();

        let json = serde_json::to_vec(&order).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["order_uid"], "b563feb7b2b84b6test");
        assert!(value["items"].is_array());

        let decoded = Order::from_json_slice(&json).unwrap();
        assert_eq!(decoded, order);
    }

    #[test]
    fn test_from_json_slice_rejects_garbage() {
        let err = Order::from_json_slice(b"{not json").unwrap_err();
        assert!(matches!(err, OrderError::Serialization { .. }));
    }
}
