use serde::{Deserialize, Serialize};

/// Recipient details for an order
///
/// One-to-one with its Order and keyed by the order's uid in storage; the
/// uid itself lives on the owning `Order`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}
