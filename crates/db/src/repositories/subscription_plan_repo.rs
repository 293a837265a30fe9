//! Repository for the `subscription_plans` table.

use marketplace_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription::{CreatePlan, SubscriptionPlan, UpdatePlan};

const COLUMNS: &str = "id, name, description, price, billing_cycle, product_limit, is_active, \
                       created_at, updated_at";

pub struct SubscriptionPlanRepo;

impl SubscriptionPlanRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreatePlan,
    ) -> Result<SubscriptionPlan, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscription_plans (name, description, price, billing_cycle, product_limit)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubscriptionPlan>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.billing_cycle)
            .bind(input.product_limit)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SubscriptionPlan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscription_plans WHERE id = $1");
        sqlx::query_as::<_, SubscriptionPlan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Plans ordered by price, optionally including deactivated ones.
    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<SubscriptionPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscription_plans
             WHERE ($1 OR is_active)
             ORDER BY price, id"
        );
        sqlx::query_as::<_, SubscriptionPlan>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePlan,
    ) -> Result<Option<SubscriptionPlan>, sqlx::Error> {
        let query = format!(
            "UPDATE subscription_plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                billing_cycle = COALESCE($5, billing_cycle),
                product_limit = COALESCE($6, product_limit),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubscriptionPlan>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.billing_cycle)
            .bind(input.product_limit)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Plans are never deleted; existing subscriptions keep referencing them.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscription_plans SET is_active = false WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
