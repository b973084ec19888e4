use serde::{Deserialize, Serialize};

/// A line item of an order
///
/// Items have no identity of their own outside their order: they are read
/// and written only as part of the aggregate, and the store replaces the
/// whole item set on every write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    /// Unit price in minor currency units
    pub price: i64,
    pub rid: String,
    pub name: String,
    /// Discount percentage, 0..=100
    pub sale: i32,
    pub size: String,
    pub total_price: f64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i32,
}

impl Item {
    /// Total for `quantity` units at `price` with a `sale` percent discount
    pub fn total_for(price: i64, quantity: u32, sale: i32) -> f64 {
        (price * i64::from(quantity)) as f64 * (1.0 - f64::from(sale) / 100.0)
    }

    /// Derive `total_price` from the item's price and sale for `quantity` units
    ///
    /// The quantity itself is not kept on the item.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.total_price = Self::total_for(self.price, quantity, self.sale);
        self
    }
}
