//! Repository for the `products` table.

use marketplace_core::catalog::ProductSort;
use marketplace_core::pagination::PageRequest;
use marketplace_core::types::DbId;
use sqlx::PgPool;

use crate::filter::{BindValue, Filter};
use crate::models::product::{CreateProduct, Product, ProductQuery, UpdateProduct};

const SELECT: &str = "SELECT p.id, p.vendor_id, v.display_name AS vendor_name, p.category_id, \
                      c.name AS category_name, p.subcategory_id, p.name, p.description, p.sku, \
                      p.price, p.stock, p.status, p.deleted_at, p.created_at, p.updated_at \
                      FROM products p \
                      JOIN vendors v ON v.id = p.vendor_id \
                      JOIN categories c ON c.id = p.category_id";

const FROM: &str = "FROM products p \
                    JOIN vendors v ON v.id = p.vendor_id \
                    JOIN categories c ON c.id = p.category_id";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO products (vendor_id, category_id, subcategory_id, name, description,
                                   sku, price, stock, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 'draft'))
             RETURNING id",
        )
        .bind(input.vendor_id)
        .bind(input.category_id)
        .bind(input.subcategory_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.sku)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.status)
        .fetch_one(pool)
        .await?;
        Self::fetch(pool, id).await
    }

    /// Find a live (not soft-deleted) product.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("{SELECT} WHERE p.id = $1 AND p.deleted_at IS NULL");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &ProductQuery,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let filter = build_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "{SELECT} {} ORDER BY {} LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            sort.order_by(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Product>(&query))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    /// Every product matching the filter, for export.
    pub async fn list_all(
        pool: &PgPool,
        params: &ProductQuery,
        sort: ProductSort,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let filter = build_filter(params);
        let query = format!(
            "{SELECT} {} ORDER BY {}",
            filter.where_clause(),
            sort.order_by()
        );
        filter
            .bind_as(sqlx::query_as::<_, Product>(&query))
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &ProductQuery) -> Result<i64, sqlx::Error> {
        let filter = build_filter(params);
        let query = format!("SELECT COUNT(*) {FROM} {}", filter.where_clause());
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Live products owned by a vendor, used for plan product limits.
    pub async fn count_by_vendor(pool: &PgPool, vendor_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE vendor_id = $1 AND deleted_at IS NULL",
        )
        .bind(vendor_id)
        .fetch_one(pool)
        .await
    }

    /// Update a live product. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products SET
                category_id = COALESCE($2, category_id),
                subcategory_id = COALESCE($3, subcategory_id),
                name = COALESCE($4, name),
                description = COALESCE($5, description),
                sku = COALESCE($6, sku),
                price = COALESCE($7, price),
                stock = COALESCE($8, stock),
                status = COALESCE($9, status)
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(input.category_id)
        .bind(input.subcategory_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.sku)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.status)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::fetch(pool, id).await.map(Some)
    }

    /// Soft-delete a product. Order history keeps referencing the row.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = NOW(), status = 'archived'
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch(pool: &PgPool, id: DbId) -> Result<Product, sqlx::Error> {
        let query = format!("{SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }
}

fn build_filter(params: &ProductQuery) -> Filter {
    let mut filter = Filter::new();
    filter
        .push_raw("p.deleted_at IS NULL")
        .eq_i64("p.vendor_id", params.vendor_id)
        .eq_i64("p.category_id", params.category_id)
        .eq_i64("p.subcategory_id", params.subcategory_id)
        .eq_text("p.status", params.status.as_deref())
        .search(&["p.name", "p.sku", "p.description"], params.search.as_deref());
    if let Some(min) = params.min_price {
        filter.push("p.price >= ?", BindValue::BigInt(min));
    }
    if let Some(max) = params.max_price {
        filter.push("p.price <= ?", BindValue::BigInt(max));
    }
    filter
}
