//! Repository for the `images` table.

use marketplace_core::types::DbId;
use sqlx::PgPool;

use crate::models::image::{CreateImage, Image};

const COLUMNS: &str = "id, product_id, file_path, original_name, content_type, size_bytes, \
                       sort_order, created_at, updated_at";

/// Metadata rows for uploaded product images. File bytes live on disk.
pub struct ImageRepo;

impl ImageRepo {
    /// Record an upload, appending it after the product's existing images.
    pub async fn create(pool: &PgPool, input: &CreateImage) -> Result<Image, sqlx::Error> {
        let query = format!(
            "INSERT INTO images (product_id, file_path, original_name, content_type, size_bytes,
                                 sort_order)
             VALUES ($1, $2, $3, $4, $5,
                     (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM images WHERE product_id = $1))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(input.product_id)
            .bind(&input.file_path)
            .bind(&input.original_name)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM images WHERE product_id = $1 ORDER BY sort_order, id");
        sqlx::query_as::<_, Image>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an image row, returning it so the caller can remove the file.
    pub async fn delete(
        pool: &PgPool,
        product_id: DbId,
        id: DbId,
    ) -> Result<Option<Image>, sqlx::Error> {
        let query = format!(
            "DELETE FROM images WHERE id = $1 AND product_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .bind(product_id)
            .fetch_optional(pool)
            .await
    }
}
