//! Repository for the `vendor_payment_methods` table.
//!
//! A vendor has at most one default method. The first method added becomes
//! the default, and deleting the default promotes the oldest remaining one.

use marketplace_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::vendor::{CreatePaymentMethod, PaymentMethod};

const COLUMNS: &str = "id, vendor_id, method_type, account_name, account_number, provider, \
                       is_default, created_at, updated_at";

pub struct PaymentMethodRepo;

impl PaymentMethodRepo {
    pub async fn create(
        pool: &PgPool,
        vendor_id: DbId,
        input: &CreatePaymentMethod,
    ) -> Result<PaymentMethod, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Serialise concurrent inserts for the same vendor.
        sqlx::query("SELECT id FROM vendors WHERE id = $1 FOR UPDATE")
            .bind(vendor_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO vendor_payment_methods
                (vendor_id, method_type, account_name, account_number, provider, is_default)
             VALUES ($1, $2, $3, $4, $5,
                     NOT EXISTS (SELECT 1 FROM vendor_payment_methods WHERE vendor_id = $1))
             RETURNING {COLUMNS}"
        );
        let method = sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(vendor_id)
            .bind(&input.method_type)
            .bind(&input.account_name)
            .bind(&input.account_number)
            .bind(&input.provider)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(method)
    }

    /// Methods for a vendor, default first.
    pub async fn list_by_vendor(
        pool: &PgPool,
        vendor_id: DbId,
    ) -> Result<Vec<PaymentMethod>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendor_payment_methods WHERE vendor_id = $1
             ORDER BY is_default DESC, created_at, id"
        );
        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(vendor_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_for_vendor(
        pool: &PgPool,
        vendor_id: DbId,
        id: DbId,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendor_payment_methods WHERE id = $1 AND vendor_id = $2"
        );
        sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(id)
            .bind(vendor_id)
            .fetch_optional(pool)
            .await
    }

    /// Make `id` the vendor's only default method.
    ///
    /// Returns `None` if the method does not belong to the vendor.
    pub async fn set_default(
        pool: &PgPool,
        vendor_id: DbId,
        id: DbId,
    ) -> Result<Option<PaymentMethod>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM vendor_payment_methods WHERE id = $1 AND vendor_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Ok(None);
        }

        // Clear first: the partial unique index forbids two defaults at once.
        sqlx::query(
            "UPDATE vendor_payment_methods SET is_default = false
             WHERE vendor_id = $1 AND is_default",
        )
        .bind(vendor_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE vendor_payment_methods SET is_default = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        let method = sqlx::query_as::<_, PaymentMethod>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(method))
    }

    /// Delete a method. If it was the default, the oldest remaining method
    /// takes over. Returns `false` if nothing matched.
    pub async fn delete(pool: &PgPool, vendor_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let was_default = sqlx::query_scalar::<_, bool>(
            "DELETE FROM vendor_payment_methods WHERE id = $1 AND vendor_id = $2
             RETURNING is_default",
        )
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_default) = was_default else {
            return Ok(false);
        };
        if was_default {
            promote_oldest(&mut tx, vendor_id).await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

async fn promote_oldest(conn: &mut PgConnection, vendor_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE vendor_payment_methods SET is_default = true
         WHERE id = (
             SELECT id FROM vendor_payment_methods WHERE vendor_id = $1
             ORDER BY created_at, id LIMIT 1
         )",
    )
    .bind(vendor_id)
    .execute(conn)
    .await?;
    Ok(())
}
