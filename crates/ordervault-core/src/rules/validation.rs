use crate::errors::OrderError;
use crate::model::Order;

/// Relative tolerance when comparing monetary sums computed in floating point
const MONEY_EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= MONEY_EPSILON * scale
}

/// Validate an order aggregate before it is persisted
///
/// Checks, in order:
///
/// 1. `order_uid` is non-empty
/// 2. every item has `sale` in 0..=100 and a non-negative `price`
/// 3. `goods_total` equals the sum of item totals
/// 4. `amount == delivery_cost + goods_total + custom_fee`
///
/// # Errors
/// Returns the first violation found.
pub fn validate_order(order: &Order) -> Result<(), OrderError> {
    if order.order_uid.trim().is_empty() {
        return Err(OrderError::EmptyOrderUid);
    }

    for (index, item) in order.items.iter().enumerate() {
        if !(0..=100).contains(&item.sale) {
            return Err(OrderError::SaleOutOfRange {
                order_uid: order.order_uid.clone(),
                index,
                sale: item.sale,
            });
        }
        if item.price < 0 {
            return Err(OrderError::NegativePrice {
                order_uid: order.order_uid.clone(),
                index,
                price: item.price,
            });
        }
    }

    let items_total = order.items_total();
    if !approx_eq(order.payment.goods_total, items_total) {
        return Err(OrderError::GoodsTotalMismatch {
            order_uid: order.order_uid.clone(),
            goods_total: order.payment.goods_total,
            items_total,
        });
    }

    let expected = order.payment.expected_amount();
    if !approx_eq(order.payment.amount, expected) {
        return Err(OrderError::AmountMismatch {
            order_uid: order.order_uid.clone(),
            amount: order.payment.amount,
            expected,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;

    fn valid_order() -> Order {
        let mut order = Order::new("o-valid");
        order.payment.delivery_cost = 100.0;
        order.items.push(
            Item {
                price: 250,
                sale: 20,
                ..Default::default()
            }
            .with_quantity(3),
        );
        order.reconcile_payment();
        order
    }

    #[test]
    fn test_reconciled_order_is_valid() {
        assert_eq!(validate_order(&valid_order()), Ok(()));
    }

    #[test]
    fn test_order_without_items_is_valid_when_reconciled() {
        let mut order = Order::new("o-empty");
        order.payment.custom_fee = 5.0;
        order.reconcile_payment();
        assert_eq!(validate_order(&order), Ok(()));
    }

    #[test]
    fn test_blank_uid_rejected() {
        let mut order = valid_order();
        order.order_uid = "   ".to_string();
        assert_eq!(validate_order(&order), Err(OrderError::EmptyOrderUid));
    }

    #[test]
    fn test_sale_out_of_range_rejected() {
        let mut order = valid_order();
        order.items[0].sale = 101;
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::SaleOutOfRange { index: 0, sale: 101, .. })
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut order = valid_order();
        order.items[0].price = -1;
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::NegativePrice { .. })
        ));
    }

    #[test]
    fn test_goods_total_mismatch_rejected() {
        let mut order = valid_order();
        order.payment.goods_total += 1.0;
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::GoodsTotalMismatch { .. })
        ));
    }

    #[test]
    fn test_amount_mismatch_rejected() {
        let mut order = valid_order();
        order.payment.amount -= 0.5;
        assert!(matches!(
            validate_order(&order),
            Err(OrderError::AmountMismatch { .. })
        ));
    }
}
