//! Aggregate queries for the dashboard landing page.

use sqlx::PgPool;

use crate::models::dashboard::{DashboardSummary, StatusCount};

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn summary(pool: &PgPool) -> Result<DashboardSummary, sqlx::Error> {
        let vendors_by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM vendors
             WHERE deleted_at IS NULL
             GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await?;

        let orders_by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await?;

        let (active_products, clients, revenue, wallet_float, pending_cash_outs): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM products WHERE status = 'active' AND deleted_at IS NULL),
                (SELECT COUNT(*) FROM clients WHERE deleted_at IS NULL),
                (SELECT COALESCE(SUM(total), 0)::BIGINT FROM orders WHERE status = 'delivered'),
                (SELECT COALESCE(SUM(balance), 0)::BIGINT FROM wallets),
                (SELECT COUNT(*) FROM cash_out_requests WHERE status = 'pending')",
        )
        .fetch_one(pool)
        .await?;

        Ok(DashboardSummary {
            vendors_by_status,
            orders_by_status,
            active_products,
            clients,
            revenue,
            wallet_float,
            pending_cash_outs,
        })
    }
}
