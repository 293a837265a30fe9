//! Order and delivery lifecycles plus order total arithmetic.

use chrono::Datelike;

use crate::error::CoreError;
use crate::types::{DbId, Money, Timestamp};

/// Maximum number of distinct line items in one order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

text_enum! {
    /// Fulfilment state of an order.
    pub enum OrderStatus("order status") {
        Pending => "pending",
        Confirmed => "confirmed",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Carrier state of a delivery.
    pub enum DeliveryStatus("delivery status") {
        Pending => "pending",
        InTransit => "in_transit",
        Delivered => "delivered",
        Failed => "failed",
    }
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }

    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot move order from '{self}' to '{next}'"
            )))
        }
    }
}

impl DeliveryStatus {
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, next),
            (Pending, InTransit) | (Pending, Failed) | (InTransit, Delivered) | (InTransit, Failed)
        )
    }

    pub fn transition(self, next: DeliveryStatus) -> Result<DeliveryStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::Conflict(format!(
                "Cannot move delivery from '{self}' to '{next}'"
            )))
        }
    }
}

/// A priced line used for total computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Money,
    pub quantity: i32,
}

impl PricedLine {
    pub fn line_total(&self) -> Result<Money, CoreError> {
        self.unit_price
            .checked_mul(Money::from(self.quantity))
            .ok_or_else(|| CoreError::Validation("Line total overflows".to_string()))
    }
}

/// Computed monetary totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

/// Sum line totals and add the shipping fee.
pub fn compute_totals(lines: &[PricedLine], shipping_fee: Money) -> Result<OrderTotals, CoreError> {
    if shipping_fee < 0 {
        return Err(CoreError::Validation(
            "Shipping fee must not be negative".to_string(),
        ));
    }
    let mut subtotal: Money = 0;
    for line in lines {
        subtotal = subtotal
            .checked_add(line.line_total()?)
            .ok_or_else(|| CoreError::Validation("Order subtotal overflows".to_string()))?;
    }
    let total = subtotal
        .checked_add(shipping_fee)
        .ok_or_else(|| CoreError::Validation("Order total overflows".to_string()))?;
    Ok(OrderTotals {
        subtotal,
        shipping_fee,
        total,
    })
}

/// Validate requested `(product_id, quantity)` pairs before touching stock.
///
/// Rejects empty orders, non-positive or oversized quantities, and the same
/// product listed twice.
pub fn validate_lines(lines: &[(DbId, i32)]) -> Result<(), CoreError> {
    if lines.is_empty() {
        return Err(CoreError::Validation(
            "An order needs at least one item".to_string(),
        ));
    }
    if lines.len() > MAX_ORDER_LINES {
        return Err(CoreError::Validation(format!(
            "An order may contain at most {MAX_ORDER_LINES} items"
        )));
    }
    let mut seen = std::collections::HashSet::new();
    for &(product_id, quantity) in lines {
        if quantity <= 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::Validation(format!(
                "Quantity for product {product_id} must be between 1 and {MAX_LINE_QUANTITY}"
            )));
        }
        if !seen.insert(product_id) {
            return Err(CoreError::Validation(format!(
                "Product {product_id} appears more than once"
            )));
        }
    }
    Ok(())
}

/// Human-facing order number, e.g. `ORD-20260301-000042`.
pub fn order_number(id: DbId, created_at: Timestamp) -> String {
    format!(
        "ORD-{:04}{:02}{:02}-{id:06}",
        created_at.year(),
        created_at.month(),
        created_at.day()
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_order_happy_path() {
        let s = OrderStatus::Pending
            .transition(OrderStatus::Confirmed)
            .and_then(|s| s.transition(OrderStatus::Shipped))
            .and_then(|s| s.transition(OrderStatus::Delivered));
        assert_eq!(s.unwrap(), OrderStatus::Delivered);
    }

    #[test]
    fn test_cannot_cancel_after_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert_matches!(
            OrderStatus::Shipped.transition(OrderStatus::Cancelled),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn test_terminal_order_states() {
        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(*next));
            assert!(!OrderStatus::Cancelled.can_transition_to(*next));
        }
    }

    #[test]
    fn test_delivery_transitions() {
        assert!(DeliveryStatus::Pending.can_transition_to(DeliveryStatus::InTransit));
        assert!(DeliveryStatus::InTransit.can_transition_to(DeliveryStatus::Delivered));
        assert!(DeliveryStatus::InTransit.can_transition_to(DeliveryStatus::Failed));
        assert!(!DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Delivered));
        assert!(DeliveryStatus::Delivered.transition(DeliveryStatus::Failed).is_err());
    }

    #[test]
    fn test_compute_totals() {
        let lines = [
            PricedLine { unit_price: 1_999, quantity: 2 },
            PricedLine { unit_price: 500, quantity: 1 },
        ];
        let totals = compute_totals(&lines, 750).unwrap();
        assert_eq!(totals.subtotal, 4_498);
        assert_eq!(totals.shipping_fee, 750);
        assert_eq!(totals.total, 5_248);
    }

    #[test]
    fn test_compute_totals_rejects_negative_shipping() {
        assert!(compute_totals(&[], -1).is_err());
    }

    #[test]
    fn test_compute_totals_overflow() {
        let lines = [PricedLine { unit_price: Money::MAX, quantity: 2 }];
        assert!(compute_totals(&lines, 0).is_err());
    }

    #[test]
    fn test_validate_lines() {
        assert!(validate_lines(&[(1, 2), (2, 1)]).is_ok());
        assert!(validate_lines(&[]).is_err());
        assert!(validate_lines(&[(1, 0)]).is_err());
        assert!(validate_lines(&[(1, MAX_LINE_QUANTITY + 1)]).is_err());
        let err = validate_lines(&[(7, 1), (7, 3)]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_order_number_format() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(order_number(42, at), "ORD-20260301-000042");
        assert_eq!(order_number(1_234_567, at), "ORD-20260301-1234567");
    }
}
