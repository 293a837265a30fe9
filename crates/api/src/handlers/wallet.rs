//! Handlers for the `/wallet` resource: balances, the credit/debit ledger,
//! and vendor cash-out requests.
//!
//! Every balance change is a single database transaction that updates the
//! wallet and appends one ledger row recording the resulting balance.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use marketplace_core::csv::{opt, CsvWriter};
use marketplace_core::error::CoreError;
use marketplace_core::money::{format_minor, validate_amount};
use marketplace_core::pagination::{Page, PageRequest};
use marketplace_core::types::{DbId, Money, Timestamp};
use marketplace_core::vendor::validate_rejection_reason;
use marketplace_core::wallet::{
    validate_cash_out, validate_description, CashOutStatus, TransactionKind,
};
use marketplace_db::models::wallet::{
    CashOutQuery, CashOutRequest, CreateCashOut, LedgerEntry, Transaction, TransactionQuery,
    Wallet, WalletMovement,
};
use marketplace_db::repositories::{CashOutRepo, PaymentMethodRepo, VendorRepo, WalletRepo};
use serde::Deserialize;

use super::export::csv_attachment;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::query::non_empty;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `add-funds` and `deduct-funds`.
#[derive(Debug, Deserialize)]
pub struct FundsRequest {
    /// Minor units (cents).
    pub amount: Money,
    pub description: Option<String>,
    pub reference: Option<String>,
}

impl FundsRequest {
    fn into_entry(self) -> AppResult<LedgerEntry> {
        validate_amount(self.amount)?;
        let description = non_empty(&self.description);
        validate_description(description.as_deref())?;
        Ok(LedgerEntry {
            amount: self.amount,
            description,
            reference: non_empty(&self.reference),
        })
    }
}

/// Query parameters for a wallet's transaction history.
#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    pub kind: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TransactionListParams {
    fn to_query(&self) -> AppResult<TransactionQuery> {
        let kind = non_empty(&self.kind);
        if let Some(k) = kind.as_deref() {
            k.parse::<TransactionKind>()?;
        }
        Ok(TransactionQuery {
            kind,
            from: self.from,
            to: self.to,
        })
    }
}

/// Request body for `POST /wallet/{user_id}/cash-out`.
#[derive(Debug, Deserialize)]
pub struct CashOutBody {
    pub amount: Money,
    pub payment_method_id: DbId,
}

/// Query parameters for `GET /wallet/cash-out-requests`.
#[derive(Debug, Deserialize)]
pub struct CashOutListParams {
    pub status: Option<String>,
    pub vendor_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /wallet/cash-out-requests/{id}/reject`.
#[derive(Debug, Deserialize)]
pub struct RejectCashOutRequest {
    pub reason: String,
}

// ---------------------------------------------------------------------------
// Wallet and ledger
// ---------------------------------------------------------------------------

/// GET /api/wallet/{user_id}
///
/// Opens an empty wallet on first access; 404 if the user does not exist.
pub async fn get_wallet(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Wallet>>> {
    let wallet = WalletRepo::get_or_create(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: wallet }))
}

/// POST /api/wallet/{user_id}/add-funds
pub async fn add_funds(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(user_id): Path<DbId>,
    Json(input): Json<FundsRequest>,
) -> AppResult<Json<DataResponse<WalletMovement>>> {
    let entry = input.into_entry()?;
    let movement = WalletRepo::credit(&state.pool, user_id, &entry).await?;

    tracing::info!(
        user_id,
        wallet_id = movement.wallet.id,
        amount = entry.amount,
        balance = movement.wallet.balance,
        actor_id = staff.user_id,
        "Wallet credited"
    );
    Ok(Json(DataResponse { data: movement }))
}

/// POST /api/wallet/{user_id}/deduct-funds
///
/// More than the balance is a 400 `INSUFFICIENT_FUNDS` and writes nothing.
pub async fn deduct_funds(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(user_id): Path<DbId>,
    Json(input): Json<FundsRequest>,
) -> AppResult<Json<DataResponse<WalletMovement>>> {
    let entry = input.into_entry()?;
    let movement = WalletRepo::debit(&state.pool, user_id, &entry).await?;

    tracing::info!(
        user_id,
        wallet_id = movement.wallet.id,
        amount = entry.amount,
        balance = movement.wallet.balance,
        actor_id = staff.user_id,
        "Wallet debited"
    );
    Ok(Json(DataResponse { data: movement }))
}

/// GET /api/wallet/{user_id}/transactions
///
/// Newest first.
pub async fn list_transactions(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(user_id): Path<DbId>,
    Query(params): Query<TransactionListParams>,
) -> AppResult<Json<DataResponse<Page<Transaction>>>> {
    let page = PageRequest::new(params.limit, params.offset);
    let filter = params.to_query()?;
    let wallet = WalletRepo::get_or_create(&state.pool, user_id).await?;

    let items = WalletRepo::list_transactions(&state.pool, wallet.id, &filter, page).await?;
    let total = WalletRepo::count_transactions(&state.pool, wallet.id, &filter).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}

/// GET /api/wallet/{user_id}/transactions/export
///
/// Chronological statement with the running balance after each entry.
pub async fn export_transactions(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(user_id): Path<DbId>,
    Query(params): Query<TransactionListParams>,
) -> AppResult<Response> {
    let filter = params.to_query()?;
    let wallet = WalletRepo::get_or_create(&state.pool, user_id).await?;
    let transactions = WalletRepo::list_all_transactions(&state.pool, wallet.id, &filter).await?;

    let mut csv = CsvWriter::new(&[
        "id",
        "created_at",
        "kind",
        "amount",
        "balance_after",
        "currency",
        "description",
        "reference",
    ]);
    for t in &transactions {
        csv.row([
            t.id.to_string(),
            t.created_at.to_rfc3339(),
            t.kind.clone(),
            format_minor(t.amount),
            format_minor(t.balance_after),
            wallet.currency.clone(),
            opt(t.description.as_deref()),
            opt(t.reference.as_deref()),
        ]);
    }

    Ok(csv_attachment(&format!("wallet-{user_id}"), csv.finish()))
}

// ---------------------------------------------------------------------------
// Cash-out requests
// ---------------------------------------------------------------------------

/// POST /api/wallet/{user_id}/cash-out
///
/// File a withdrawal for a vendor user to one of that vendor's payment
/// methods. Funds move only when an admin approves the request.
pub async fn request_cash_out(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(user_id): Path<DbId>,
    Json(input): Json<CashOutBody>,
) -> AppResult<(StatusCode, Json<DataResponse<CashOutRequest>>)> {
    validate_amount(input.amount)?;

    let vendor = VendorRepo::find_by_user_id(&state.pool, user_id)
        .await?
        .filter(|v| v.deleted_at.is_none())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "User {user_id} is not a vendor"
            )))
        })?;

    PaymentMethodRepo::find_for_vendor(&state.pool, vendor.id, input.payment_method_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Payment method {} does not belong to vendor {}",
                input.payment_method_id, vendor.id
            )))
        })?;

    let wallet = WalletRepo::get_or_create(&state.pool, user_id).await?;
    validate_cash_out(wallet.balance, input.amount)?;

    let request = CashOutRepo::create(
        &state.pool,
        &CreateCashOut {
            wallet_id: wallet.id,
            vendor_id: vendor.id,
            payment_method_id: input.payment_method_id,
            amount: input.amount,
        },
    )
    .await?;

    tracing::info!(
        cash_out_id = request.id,
        vendor_id = vendor.id,
        amount = input.amount,
        "Cash-out requested"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/wallet/cash-out-requests
///
/// Oldest first, so the queue reads in the order it should be worked.
pub async fn list_cash_out_requests(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<CashOutListParams>,
) -> AppResult<Json<DataResponse<Page<CashOutRequest>>>> {
    let page = PageRequest::new(params.limit, params.offset);
    let status = non_empty(&params.status);
    if let Some(s) = status.as_deref() {
        s.parse::<CashOutStatus>()?;
    }
    let filter = CashOutQuery {
        status,
        vendor_id: params.vendor_id,
    };

    let items = CashOutRepo::list(&state.pool, &filter, page).await?;
    let total = CashOutRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page::new(items, total, page),
    }))
}

/// POST /api/wallet/cash-out-requests/{id}/approve
///
/// Debits the wallet and marks the request paid in one transaction. If the
/// balance no longer covers it the request stays pending (400).
pub async fn approve_cash_out(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CashOutRequest>>> {
    let request = CashOutRepo::approve(&state.pool, id, admin.user_id).await?;

    tracing::info!(
        cash_out_id = id,
        amount = request.amount,
        approved_by = admin.user_id,
        "Cash-out paid"
    );
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/wallet/cash-out-requests/{id}/reject
pub async fn reject_cash_out(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RejectCashOutRequest>,
) -> AppResult<Json<DataResponse<CashOutRequest>>> {
    validate_rejection_reason(&input.reason)?;
    let request =
        CashOutRepo::reject(&state.pool, id, admin.user_id, input.reason.trim()).await?;

    tracing::info!(cash_out_id = id, rejected_by = admin.user_id, "Cash-out rejected");
    Ok(Json(DataResponse { data: request }))
}
