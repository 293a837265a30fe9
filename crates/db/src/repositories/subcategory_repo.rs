//! Repository for the `subcategories` table. Every query is scoped to the
//! parent category so a mismatched pair reads as not found.

use marketplace_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Subcategory, UpdateSubcategory};

const COLUMNS: &str = "id, category_id, name, slug, is_active, created_at, updated_at";

pub struct SubcategoryRepo;

impl SubcategoryRepo {
    pub async fn create(
        pool: &PgPool,
        category_id: DbId,
        name: &str,
        slug: &str,
    ) -> Result<Subcategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO subcategories (category_id, name, slug)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(category_id)
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        category_id: DbId,
        id: DbId,
    ) -> Result<Option<Subcategory>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM subcategories WHERE id = $1 AND category_id = $2");
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .bind(category_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<Subcategory>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM subcategories WHERE category_id = $1 ORDER BY name");
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        category_id: DbId,
        id: DbId,
        input: &UpdateSubcategory,
    ) -> Result<Option<Subcategory>, sqlx::Error> {
        let query = format!(
            "UPDATE subcategories SET
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                is_active = COALESCE($5, is_active)
             WHERE id = $1 AND category_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .bind(category_id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, category_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1 AND category_id = $2")
            .bind(id)
            .bind(category_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
