//! Repository for `cash_out_requests`.

use marketplace_core::error::CoreError;
use marketplace_core::pagination::PageRequest;
use marketplace_core::types::{DbId, Money};
use marketplace_core::wallet::{CashOutStatus, TransactionKind};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::error::DbError;
use crate::filter::Filter;
use crate::models::wallet::{CashOutQuery, CashOutRequest, CreateCashOut, LedgerEntry};
use crate::repositories::WalletRepo;

const SELECT: &str = "SELECT r.id, r.wallet_id, r.vendor_id, v.display_name AS vendor_name, \
                      r.payment_method_id, r.amount, r.status, r.processed_by, r.processed_at, \
                      r.rejection_reason, r.transaction_id, r.created_at, r.updated_at \
                      FROM cash_out_requests r JOIN vendors v ON v.id = r.vendor_id";

#[derive(Debug, FromRow)]
struct LockedRequest {
    wallet_id: DbId,
    amount: Money,
    status: String,
}

pub struct CashOutRepo;

impl CashOutRepo {
    /// File a pending request. Funds are only moved on approval.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCashOut,
    ) -> Result<CashOutRequest, sqlx::Error> {
        let id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO cash_out_requests (wallet_id, vendor_id, payment_method_id, amount)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(input.wallet_id)
        .bind(input.vendor_id)
        .bind(input.payment_method_id)
        .bind(input.amount)
        .fetch_one(pool)
        .await?;
        let mut conn = pool.acquire().await?;
        fetch(&mut conn, id).await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CashOutRequest>, sqlx::Error> {
        let query = format!("{SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, CashOutRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of the queue, oldest pending work first.
    pub async fn list(
        pool: &PgPool,
        params: &CashOutQuery,
        page: PageRequest,
    ) -> Result<Vec<CashOutRequest>, sqlx::Error> {
        let filter = build_filter(params);
        let idx = filter.next_index();
        let query = format!(
            "{SELECT} {} ORDER BY r.created_at, r.id LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, CashOutRequest>(&query))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &CashOutQuery) -> Result<i64, sqlx::Error> {
        let filter = build_filter(params);
        let query = format!(
            "SELECT COUNT(*) FROM cash_out_requests r {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }

    /// Debit the wallet and mark the request paid, atomically.
    ///
    /// If the balance no longer covers the amount the whole transaction rolls
    /// back and the request stays pending.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        actor_id: DbId,
    ) -> Result<CashOutRequest, DbError> {
        let mut tx = pool.begin().await?;
        let request = lock(&mut tx, id).await?;
        request.status.parse::<CashOutStatus>()?.ensure_pending()?;

        let entry = LedgerEntry {
            amount: request.amount,
            description: Some(format!("Cash-out request #{id}")),
            reference: Some(format!("cash_out:{id}")),
        };
        let movement =
            WalletRepo::apply_in_tx(&mut tx, request.wallet_id, TransactionKind::Debit, &entry)
                .await?;

        sqlx::query(
            "UPDATE cash_out_requests SET
                status = $2, processed_by = $3, processed_at = NOW(), transaction_id = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(CashOutStatus::Paid.as_str())
        .bind(actor_id)
        .bind(movement.transaction.id)
        .execute(&mut *tx)
        .await?;

        let approved = fetch(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(cash_out_id = id, amount = request.amount, actor_id, "Cash-out paid");
        Ok(approved)
    }

    /// Mark a pending request rejected. No funds move.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        actor_id: DbId,
        reason: &str,
    ) -> Result<CashOutRequest, DbError> {
        let mut tx = pool.begin().await?;
        let request = lock(&mut tx, id).await?;
        request.status.parse::<CashOutStatus>()?.ensure_pending()?;

        sqlx::query(
            "UPDATE cash_out_requests SET
                status = $2, processed_by = $3, processed_at = NOW(), rejection_reason = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(CashOutStatus::Rejected.as_str())
        .bind(actor_id)
        .bind(reason)
        .execute(&mut *tx)
        .await?;

        let rejected = fetch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(rejected)
    }
}

async fn lock(conn: &mut PgConnection, id: DbId) -> Result<LockedRequest, DbError> {
    let request = sqlx::query_as::<_, LockedRequest>(
        "SELECT wallet_id, amount, status FROM cash_out_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or(CoreError::NotFound {
        entity: "CashOutRequest",
        id,
    })?;
    Ok(request)
}

async fn fetch(conn: &mut PgConnection, id: DbId) -> Result<CashOutRequest, sqlx::Error> {
    let query = format!("{SELECT} WHERE r.id = $1");
    sqlx::query_as::<_, CashOutRequest>(&query)
        .bind(id)
        .fetch_one(conn)
        .await
}

fn build_filter(params: &CashOutQuery) -> Filter {
    let mut filter = Filter::new();
    filter
        .eq_text("r.status", params.status.as_deref())
        .eq_i64("r.vendor_id", params.vendor_id);
    filter
}
