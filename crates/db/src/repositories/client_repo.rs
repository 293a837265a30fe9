//! Repository for the `clients` table.

use marketplace_core::pagination::PageRequest;
use marketplace_core::types::DbId;
use sqlx::PgPool;

use crate::filter::Filter;
use crate::models::client::{Client, CreateClient, UpdateClient};

const SELECT: &str = "SELECT c.id, c.user_id, u.full_name, u.email, u.phone, c.shipping_address, \
                      c.city, c.country, c.deleted_at, c.created_at, c.updated_at \
                      FROM clients c JOIN users u ON u.id = c.user_id";

/// Buyer profiles, always read together with the owning user.
pub struct ClientRepo;

impl ClientRepo {
    pub async fn create(pool: &PgPool, input: &CreateClient) -> Result<Client, sqlx::Error> {
        let id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO clients (user_id, shipping_address, city, country)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(input.user_id)
        .bind(&input.shipping_address)
        .bind(&input.city)
        .bind(&input.country)
        .fetch_one(pool)
        .await?;
        Self::fetch(pool, id).await
    }

    /// Find a non-deleted client by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("{SELECT} WHERE c.id = $1 AND c.deleted_at IS NULL");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Client>, sqlx::Error> {
        let filter = build_filter(search);
        let idx = filter.next_index();
        let query = format!(
            "{SELECT} {} ORDER BY c.created_at DESC, c.id DESC LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Client>(&query))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let filter = build_filter(search);
        let query = format!(
            "SELECT COUNT(*) FROM clients c JOIN users u ON u.id = c.user_id {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Update a client. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE clients SET
                shipping_address = COALESCE($2, shipping_address),
                city = COALESCE($3, city),
                country = COALESCE($4, country)
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(&input.shipping_address)
        .bind(&input.city)
        .bind(&input.country)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::fetch(pool, id).await.map(Some)
    }

    /// Soft-delete a client. Returns `true` if the row was live.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE clients SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch(pool: &PgPool, id: DbId) -> Result<Client, sqlx::Error> {
        let query = format!("{SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }
}

fn build_filter(search: Option<&str>) -> Filter {
    let mut filter = Filter::new();
    filter
        .push_raw("c.deleted_at IS NULL")
        .search(&["u.full_name", "u.email"], search);
    filter
}
