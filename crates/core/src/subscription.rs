//! Vendor subscription plans and billing periods.

use chrono::Months;

use crate::error::CoreError;
use crate::types::Timestamp;

text_enum! {
    /// How often a plan renews.
    pub enum BillingCycle("billing cycle") {
        Monthly => "monthly",
        Yearly => "yearly",
    }
}

text_enum! {
    /// State of a vendor's subscription.
    pub enum SubscriptionStatus("subscription status") {
        Active => "active",
        Cancelled => "cancelled",
        Expired => "expired",
    }
}

impl BillingCycle {
    fn months(self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Yearly => 12,
        }
    }

    /// End of the billing period starting at `start`.
    ///
    /// Day-of-month is clamped, so Jan 31 + 1 month is the last day of February.
    pub fn period_end(self, start: Timestamp) -> Result<Timestamp, CoreError> {
        start
            .checked_add_months(Months::new(self.months()))
            .ok_or_else(|| CoreError::Validation("Billing period end is out of range".to_string()))
    }
}

impl SubscriptionStatus {
    /// Only active subscriptions may be cancelled.
    pub fn ensure_cancellable(self) -> Result<(), CoreError> {
        if self == SubscriptionStatus::Active {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Subscription is {self} and cannot be cancelled"
            )))
        }
    }
}

/// A plan's product limit must be positive when set.
pub fn validate_product_limit(limit: Option<i32>) -> Result<(), CoreError> {
    match limit {
        Some(n) if n <= 0 => Err(CoreError::Validation(
            "product_limit must be greater than zero".to_string(),
        )),
        _ => Ok(()),
    }
}
