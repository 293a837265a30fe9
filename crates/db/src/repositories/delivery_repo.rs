//! Repository for the `deliveries` table (one delivery per order).

use marketplace_core::error::CoreError;
use marketplace_core::order::{DeliveryStatus, OrderStatus};
use marketplace_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::models::order::{CreateDelivery, Delivery};

const COLUMNS: &str = "id, order_id, carrier, tracking_number, status, shipped_at, delivered_at, \
                       created_at, updated_at";

pub struct DeliveryRepo;

impl DeliveryRepo {
    /// Create the delivery for an order. A second delivery for the same order
    /// violates `uq_deliveries_order_id`.
    pub async fn create(
        pool: &PgPool,
        order_id: DbId,
        input: &CreateDelivery,
    ) -> Result<Delivery, DbError> {
        let status: String = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(pool)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Order",
                id: order_id,
            })?;
        if status.parse::<OrderStatus>()? == OrderStatus::Cancelled {
            return Err(CoreError::Conflict(
                "Cannot create a delivery for a cancelled order".to_string(),
            )
            .into());
        }

        let query = format!(
            "INSERT INTO deliveries (order_id, carrier, tracking_number)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let delivery = sqlx::query_as::<_, Delivery>(&query)
            .bind(order_id)
            .bind(&input.carrier)
            .bind(&input.tracking_number)
            .fetch_one(pool)
            .await?;
        Ok(delivery)
    }

    pub async fn find_by_order(
        conn: &mut PgConnection,
        order_id: DbId,
    ) -> Result<Option<Delivery>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM deliveries WHERE order_id = $1");
        sqlx::query_as::<_, Delivery>(&query)
            .bind(order_id)
            .fetch_optional(conn)
            .await
    }

    /// Move an order's delivery to `next`, stamping `shipped_at` when it goes
    /// in transit and `delivered_at` when it arrives.
    pub async fn update_status(
        pool: &PgPool,
        order_id: DbId,
        next: DeliveryStatus,
    ) -> Result<Delivery, DbError> {
        let mut tx = pool.begin().await?;

        let (id, current): (DbId, String) =
            sqlx::query_as("SELECT id, status FROM deliveries WHERE order_id = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Delivery",
                    id: order_id,
                })?;
        let next = current.parse::<DeliveryStatus>()?.transition(next)?;

        let query = format!(
            "UPDATE deliveries SET
                status = $2,
                shipped_at = CASE WHEN $2 = 'in_transit' THEN NOW() ELSE shipped_at END,
                delivered_at = CASE WHEN $2 = 'delivered' THEN NOW() ELSE delivered_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let delivery = sqlx::query_as::<_, Delivery>(&query)
            .bind(id)
            .bind(next.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(delivery)
    }
}
