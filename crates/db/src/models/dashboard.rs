//! Dashboard summary model.

use marketplace_core::types::Money;
use serde::Serialize;
use sqlx::FromRow;

/// A `(status, count)` pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Headline numbers for the dashboard landing page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub vendors_by_status: Vec<StatusCount>,
    pub orders_by_status: Vec<StatusCount>,
    pub active_products: i64,
    pub clients: i64,
    /// Sum of delivered order totals.
    pub revenue: Money,
    /// Sum of all wallet balances.
    pub wallet_float: Money,
    pub pending_cash_outs: i64,
}
