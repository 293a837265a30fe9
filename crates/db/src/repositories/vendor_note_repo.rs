//! Repository for the `vendor_notes` table.

use marketplace_core::types::DbId;
use sqlx::PgPool;

use crate::models::vendor::VendorNote;

const COLUMNS: &str = "id, vendor_id, author_id, body, created_at, updated_at";

/// Internal staff notes attached to a vendor.
pub struct VendorNoteRepo;

impl VendorNoteRepo {
    pub async fn create(
        pool: &PgPool,
        vendor_id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<VendorNote, sqlx::Error> {
        let query = format!(
            "INSERT INTO vendor_notes (vendor_id, author_id, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VendorNote>(&query)
            .bind(vendor_id)
            .bind(author_id)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// Notes for a vendor, newest first.
    pub async fn list_by_vendor(
        pool: &PgPool,
        vendor_id: DbId,
    ) -> Result<Vec<VendorNote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vendor_notes WHERE vendor_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, VendorNote>(&query)
            .bind(vendor_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, vendor_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vendor_notes WHERE id = $1 AND vendor_id = $2")
            .bind(id)
            .bind(vendor_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
