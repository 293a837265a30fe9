//! Wallet, ledger transaction, and cash-out request models.

use marketplace_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `wallets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wallet {
    pub id: DbId,
    pub user_id: DbId,
    pub balance: Money,
    pub currency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the append-only `transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    pub wallet_id: DbId,
    pub kind: String,
    pub amount: Money,
    pub balance_after: Money,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub created_at: Timestamp,
}

/// Input for a single credit or debit.
#[derive(Debug, Clone, Default)]
pub struct LedgerEntry {
    pub amount: Money,
    pub description: Option<String>,
    pub reference: Option<String>,
}

/// Wallet state and the ledger row written by one balance change.
#[derive(Debug, Clone, Serialize)]
pub struct WalletMovement {
    pub wallet: Wallet,
    pub transaction: Transaction,
}

/// Filters for a wallet's transaction history.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub kind: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

/// A row from the `cash_out_requests` table joined with the vendor name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CashOutRequest {
    pub id: DbId,
    pub wallet_id: DbId,
    pub vendor_id: DbId,
    pub vendor_name: String,
    pub payment_method_id: DbId,
    pub amount: Money,
    pub status: String,
    pub processed_by: Option<DbId>,
    pub processed_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
    pub transaction_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for filing a cash-out request.
#[derive(Debug, Clone)]
pub struct CreateCashOut {
    pub wallet_id: DbId,
    pub vendor_id: DbId,
    pub payment_method_id: DbId,
    pub amount: Money,
}

/// Filters for the cash-out queue.
#[derive(Debug, Clone, Default)]
pub struct CashOutQuery {
    pub status: Option<String>,
    pub vendor_id: Option<DbId>,
}
