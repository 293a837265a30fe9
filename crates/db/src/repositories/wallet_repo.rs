//! Repository for `wallets` and the append-only `transactions` ledger.
//!
//! Every balance change happens inside one transaction that locks the wallet
//! row, computes the new balance, writes it, and appends exactly one ledger
//! row carrying `balance_after`. A failed debit writes nothing.

use marketplace_core::error::CoreError;
use marketplace_core::pagination::PageRequest;
use marketplace_core::types::{DbId, Money};
use marketplace_core::wallet::{TransactionKind, DEFAULT_CURRENCY};
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::filter::{BindValue, Filter};
use crate::models::wallet::{LedgerEntry, Transaction, TransactionQuery, Wallet, WalletMovement};

const COLUMNS: &str = "id, user_id, balance, currency, created_at, updated_at";

const TX_COLUMNS: &str =
    "id, wallet_id, kind, amount, balance_after, description, reference, created_at";

pub struct WalletRepo;

impl WalletRepo {
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Wallet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wallets WHERE user_id = $1");
        sqlx::query_as::<_, Wallet>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Return the user's wallet, opening an empty one on first access.
    ///
    /// Fails with `NotFound` when the user does not exist.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<Wallet, DbError> {
        let mut conn = pool.acquire().await?;
        ensure_wallet(&mut conn, user_id).await
    }

    /// Credit the user's wallet.
    pub async fn credit(
        pool: &PgPool,
        user_id: DbId,
        entry: &LedgerEntry,
    ) -> Result<WalletMovement, DbError> {
        Self::apply(pool, user_id, TransactionKind::Credit, entry).await
    }

    /// Debit the user's wallet. Fails with `InsufficientFunds` when the amount
    /// exceeds the balance.
    pub async fn debit(
        pool: &PgPool,
        user_id: DbId,
        entry: &LedgerEntry,
    ) -> Result<WalletMovement, DbError> {
        Self::apply(pool, user_id, TransactionKind::Debit, entry).await
    }

    async fn apply(
        pool: &PgPool,
        user_id: DbId,
        kind: TransactionKind,
        entry: &LedgerEntry,
    ) -> Result<WalletMovement, DbError> {
        let mut tx = pool.begin().await?;
        let wallet = ensure_wallet(&mut tx, user_id).await?;
        let movement = Self::apply_in_tx(&mut tx, wallet.id, kind, entry).await?;
        tx.commit().await?;

        tracing::info!(
            user_id,
            wallet_id = movement.wallet.id,
            kind = %kind,
            amount = entry.amount,
            balance = movement.wallet.balance,
            "Wallet balance changed",
        );
        Ok(movement)
    }

    /// Apply one ledger entry on an open transaction. The caller commits.
    pub async fn apply_in_tx(
        conn: &mut PgConnection,
        wallet_id: DbId,
        kind: TransactionKind,
        entry: &LedgerEntry,
    ) -> Result<WalletMovement, DbError> {
        let balance: Money =
            sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1 FOR UPDATE")
                .bind(wallet_id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Wallet",
                    id: wallet_id,
                })?;
        let new_balance = kind.apply(balance, entry.amount)?;

        let query = format!("UPDATE wallets SET balance = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let wallet = sqlx::query_as::<_, Wallet>(&query)
            .bind(wallet_id)
            .bind(new_balance)
            .fetch_one(&mut *conn)
            .await?;

        let query = format!(
            "INSERT INTO transactions
                (wallet_id, kind, amount, balance_after, description, reference)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TX_COLUMNS}"
        );
        let transaction = sqlx::query_as::<_, Transaction>(&query)
            .bind(wallet_id)
            .bind(kind.as_str())
            .bind(entry.amount)
            .bind(wallet.balance)
            .bind(&entry.description)
            .bind(&entry.reference)
            .fetch_one(&mut *conn)
            .await?;

        Ok(WalletMovement {
            wallet,
            transaction,
        })
    }

    /// One page of a wallet's ledger, newest first.
    pub async fn list_transactions(
        pool: &PgPool,
        wallet_id: DbId,
        params: &TransactionQuery,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let filter = build_filter(wallet_id, params);
        let idx = filter.next_index();
        let query = format!(
            "SELECT {TX_COLUMNS} FROM transactions {} \
             ORDER BY created_at DESC, id DESC LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );
        filter
            .bind_as(sqlx::query_as::<_, Transaction>(&query))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(pool)
            .await
    }

    /// The full filtered ledger in chronological order, for export.
    pub async fn list_all_transactions(
        pool: &PgPool,
        wallet_id: DbId,
        params: &TransactionQuery,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let filter = build_filter(wallet_id, params);
        let query = format!(
            "SELECT {TX_COLUMNS} FROM transactions {} ORDER BY created_at, id",
            filter.where_clause()
        );
        filter
            .bind_as(sqlx::query_as::<_, Transaction>(&query))
            .fetch_all(pool)
            .await
    }

    pub async fn count_transactions(
        pool: &PgPool,
        wallet_id: DbId,
        params: &TransactionQuery,
    ) -> Result<i64, sqlx::Error> {
        let filter = build_filter(wallet_id, params);
        let query = format!("SELECT COUNT(*) FROM transactions {}", filter.where_clause());
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }
}

/// Fetch or open the wallet for `user_id` on the given connection.
pub(crate) async fn ensure_wallet(
    conn: &mut PgConnection,
    user_id: DbId,
) -> Result<Wallet, DbError> {
    let user_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    if !user_exists {
        return Err(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }
        .into());
    }

    sqlx::query(
        "INSERT INTO wallets (user_id, currency) VALUES ($1, $2)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(DEFAULT_CURRENCY)
    .execute(&mut *conn)
    .await?;

    let query = format!("SELECT {COLUMNS} FROM wallets WHERE user_id = $1");
    let wallet = sqlx::query_as::<_, Wallet>(&query)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(wallet)
}

fn build_filter(wallet_id: DbId, params: &TransactionQuery) -> Filter {
    let mut filter = Filter::new();
    filter
        .eq_i64("wallet_id", Some(wallet_id))
        .eq_text("kind", params.kind.as_deref());
    if let Some(from) = params.from {
        filter.push("created_at >= ?", BindValue::Timestamp(from));
    }
    if let Some(to) = params.to {
        filter.push("created_at <= ?", BindValue::Timestamp(to));
    }
    filter
}
