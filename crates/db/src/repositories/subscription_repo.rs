//! Repository for vendor `subscriptions`.
//!
//! A vendor holds at most one active subscription, enforced by the partial
//! unique index `uq_subscriptions_active_vendor`.

use chrono::Utc;
use marketplace_core::error::CoreError;
use marketplace_core::pagination::PageRequest;
use marketplace_core::subscription::{BillingCycle, SubscriptionStatus};
use marketplace_core::types::{DbId, Money};
use marketplace_core::wallet::TransactionKind;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::error::DbError;
use crate::filter::Filter;
use crate::models::subscription::{CreateSubscription, Subscription, SubscriptionQuery};
use crate::models::wallet::LedgerEntry;
use crate::repositories::wallet_repo::ensure_wallet;
use crate::repositories::WalletRepo;

const SELECT: &str = "SELECT s.id, s.vendor_id, v.display_name AS vendor_name, s.plan_id, \
                      p.name AS plan_name, s.status, s.starts_at, s.ends_at, s.cancelled_at, \
                      s.transaction_id, s.created_at, s.updated_at \
                      FROM subscriptions s \
                      JOIN vendors v ON v.id = s.vendor_id \
                      JOIN subscription_plans p ON p.id = s.plan_id";

#[derive(Debug, FromRow)]
struct PlanTerms {
    name: String,
    price: Money,
    billing_cycle: String,
    is_active: bool,
}

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Start a subscription for one billing cycle from now.
    ///
    /// With `pay_from_wallet` the plan price is debited from the vendor's
    /// wallet in the same transaction, and the ledger row is linked.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubscription,
    ) -> Result<Subscription, DbError> {
        let mut tx = pool.begin().await?;

        let vendor_user: DbId = sqlx::query_scalar(
            "SELECT user_id FROM vendors WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(input.vendor_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Vendor",
            id: input.vendor_id,
        })?;

        let plan = sqlx::query_as::<_, PlanTerms>(
            "SELECT name, price, billing_cycle, is_active FROM subscription_plans WHERE id = $1",
        )
        .bind(input.plan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "SubscriptionPlan",
            id: input.plan_id,
        })?;
        if !plan.is_active {
            return Err(
                CoreError::Validation(format!("Plan '{}' is not available", plan.name)).into(),
            );
        }

        // A lapsed term still marked active must not block renewal while the
        // background sweep has yet to reach it.
        let lapsed = sqlx::query(
            "UPDATE subscriptions SET status = 'expired'
             WHERE vendor_id = $1 AND status = 'active' AND ends_at <= NOW()",
        )
        .bind(input.vendor_id)
        .execute(&mut *tx)
        .await?;
        if lapsed.rows_affected() > 0 {
            tracing::info!(vendor_id = input.vendor_id, "Lapsed subscription expired on renewal");
        }

        let has_active: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM subscriptions WHERE vendor_id = $1 AND status = 'active'
             )",
        )
        .bind(input.vendor_id)
        .fetch_one(&mut *tx)
        .await?;
        if has_active {
            return Err(CoreError::Conflict(
                "Vendor already has an active subscription".to_string(),
            )
            .into());
        }

        let starts_at = Utc::now();
        let ends_at = plan.billing_cycle.parse::<BillingCycle>()?.period_end(starts_at)?;

        let transaction_id = if input.pay_from_wallet && plan.price > 0 {
            let wallet = ensure_wallet(&mut tx, vendor_user).await?;
            let entry = LedgerEntry {
                amount: plan.price,
                description: Some(format!("Subscription: {}", plan.name)),
                reference: Some(format!("subscription_plan:{}", input.plan_id)),
            };
            let movement =
                WalletRepo::apply_in_tx(&mut tx, wallet.id, TransactionKind::Debit, &entry).await?;
            Some(movement.transaction.id)
        } else {
            None
        };

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO subscriptions
                (vendor_id, plan_id, status, starts_at, ends_at, transaction_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(input.vendor_id)
        .bind(input.plan_id)
        .bind(SubscriptionStatus::Active.as_str())
        .bind(starts_at)
        .bind(ends_at)
        .bind(transaction_id)
        .fetch_one(&mut *tx)
        .await?;

        let subscription = fetch(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            subscription_id = id,
            vendor_id = input.vendor_id,
            plan_id = input.plan_id,
            paid = transaction_id.is_some(),
            "Subscription started",
        );
        Ok(subscription)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("{SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The vendor's current active subscription, if any.
    pub async fn find_active_for_vendor(
        pool: &PgPool,
        vendor_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("{SELECT} WHERE s.vendor_id = $1 AND s.status = 'active'");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(vendor_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &SubscriptionQuery,
        page: PageRequest,
    ) -> Result<Vec<Subscription>, sqlx::Error> {
        let filter = build_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "{SELECT} {} ORDER BY s.created_at DESC, s.id DESC LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Subscription>(&query))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &SubscriptionQuery) -> Result<i64, sqlx::Error> {
        let filter = build_filter(params);
        let query = format!("SELECT COUNT(*) FROM subscriptions s {}", filter.where_clause());
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Cancel an active subscription. No refund is issued.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Subscription, DbError> {
        let mut tx = pool.begin().await?;

        let status: String =
            sqlx::query_scalar("SELECT status FROM subscriptions WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Subscription",
                    id,
                })?;
        status.parse::<SubscriptionStatus>()?.ensure_cancellable()?;

        sqlx::query("UPDATE subscriptions SET status = $2, cancelled_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(SubscriptionStatus::Cancelled.as_str())
            .execute(&mut *tx)
            .await?;

        let subscription = fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(subscription)
    }

    /// Mark active subscriptions whose period has ended as expired, returning
    /// how many were updated.
    pub async fn expire_lapsed(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions SET status = 'expired'
             WHERE status = 'active' AND ends_at <= NOW()",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

async fn fetch(conn: &mut PgConnection, id: DbId) -> Result<Subscription, sqlx::Error> {
    let query = format!("{SELECT} WHERE s.id = $1");
    sqlx::query_as::<_, Subscription>(&query)
        .bind(id)
        .fetch_one(conn)
        .await
}

fn build_filter(params: &SubscriptionQuery) -> Filter {
    let mut filter = Filter::new();
    filter
        .eq_i64("s.vendor_id", params.vendor_id)
        .eq_text("s.status", params.status.as_deref());
    filter
}
