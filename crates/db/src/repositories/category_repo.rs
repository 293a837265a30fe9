//! Repository for the `categories` table.

use marketplace_core::error::CoreError;
use marketplace_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::error::DbError;
use crate::models::category::{Category, CategorySummary, CreateCategory, UpdateCategory};

const COLUMNS: &str = "id, name, slug, description, image_path, is_active, created_at, updated_at";

/// Provides CRUD operations for product categories.
pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, slug, description, image_path)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.image_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All categories by name, each with its subcategory count.
    pub async fn list(
        pool: &PgPool,
        active_only: bool,
    ) -> Result<Vec<CategorySummary>, sqlx::Error> {
        sqlx::query_as::<_, CategorySummary>(
            "SELECT c.id, c.name, c.slug, c.description, c.image_path, c.is_active,
                    COUNT(s.id) AS subcategory_count, c.created_at
             FROM categories c
             LEFT JOIN subcategories s ON s.category_id = c.id
             WHERE ($1 = false OR c.is_active)
             GROUP BY c.id
             ORDER BY c.name",
        )
        .bind(active_only)
        .fetch_all(pool)
        .await
    }

    /// Update a category. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                image_path = COALESCE($5, image_path),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.image_path)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Number of live products filed under a category.
    pub async fn product_count<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE category_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Hard-delete a category; its subcategories cascade.
    ///
    /// Refused with `Conflict` while live products are filed under it.
    /// Soft-deleted products are detached from the category first so their
    /// order history stays intact. Returns `false` if the category is missing.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let found: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if found.is_none() {
            return Ok(false);
        }

        let live = Self::product_count(&mut *tx, id).await?;
        if live > 0 {
            return Err(CoreError::Conflict(format!(
                "Category {id} still has {live} product(s)"
            ))
            .into());
        }

        let detached = sqlx::query(
            "UPDATE products SET category_id = NULL, subcategory_id = NULL
             WHERE category_id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(
            category_id = id,
            detached = detached.rows_affected(),
            "Category removed"
        );
        Ok(true)
    }
}
