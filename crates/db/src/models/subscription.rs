//! Subscription plan and vendor subscription models.

use marketplace_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `subscription_plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubscriptionPlan {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub billing_cycle: String,
    pub product_limit: Option<i32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlan {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub billing_cycle: String,
    pub product_limit: Option<i32>,
}

/// DTO for updating a plan. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub billing_cycle: Option<String>,
    pub product_limit: Option<i32>,
    pub is_active: Option<bool>,
}

/// A subscription row joined with vendor and plan names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub vendor_id: DbId,
    pub vendor_name: String,
    pub plan_id: DbId,
    pub plan_name: String,
    pub status: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub cancelled_at: Option<Timestamp>,
    pub transaction_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for starting a subscription. The period runs from now for one
/// billing cycle of the plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscription {
    pub vendor_id: DbId,
    pub plan_id: DbId,
    #[serde(default)]
    pub pay_from_wallet: bool,
}

/// Filters for the subscription list.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionQuery {
    pub vendor_id: Option<DbId>,
    pub status: Option<String>,
}
