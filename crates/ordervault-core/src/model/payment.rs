use serde::{Deserialize, Serialize};

/// Payment record for an order
///
/// Invariant for every persisted payment:
/// `amount == delivery_cost + goods_total + custom_fee`, where `goods_total`
/// is the sum of the order's item totals. `Order::reconcile_payment` restores
/// it; validation rejects orders that break it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "transaction")]
    pub transaction_id: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: f64,
    /// Unix timestamp (seconds) of the payment
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: f64,
    pub goods_total: f64,
    pub custom_fee: f64,
}

impl Payment {
    /// The amount implied by the three components
    pub fn expected_amount(&self) -> f64 {
        self.delivery_cost + self.goods_total + self.custom_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_amount_sums_components() {
        let payment = Payment {
            delivery_cost: 1500.0,
            goods_total: 317.0,
            custom_fee: 3.5,
            ..Default::default()
        };
        assert_eq!(payment.expected_amount(), 1820.5);
    }

    #[test]
    fn test_transaction_field_uses_event_name() {
        let payment = Payment {
            transaction_id: "b563feb7b2b84b6test".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["transaction"], "b563feb7b2b84b6test");
    }
}
