//! Route definitions for the `/wallet` resource.
//!
//! ```text
//! WALLETS (keyed by owning user):
//! GET    /{user_id}                         get_wallet
//! POST   /{user_id}/add-funds               add_funds
//! POST   /{user_id}/deduct-funds            deduct_funds
//! GET    /{user_id}/transactions            list_transactions
//! GET    /{user_id}/transactions/export     export_transactions (CSV)
//! POST   /{user_id}/cash-out                request_cash_out
//!
//! CASH-OUT QUEUE:
//! GET    /cash-out-requests                 list_cash_out_requests
//! POST   /cash-out-requests/{id}/approve    approve_cash_out (admin)
//! POST   /cash-out-requests/{id}/reject     reject_cash_out (admin)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::wallet;
use crate::state::AppState;

/// Routes mounted at `/wallet`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cash-out-requests", get(wallet::list_cash_out_requests))
        .route(
            "/cash-out-requests/{id}/approve",
            post(wallet::approve_cash_out),
        )
        .route(
            "/cash-out-requests/{id}/reject",
            post(wallet::reject_cash_out),
        )
        .route("/{user_id}", get(wallet::get_wallet))
        .route("/{user_id}/add-funds", post(wallet::add_funds))
        .route("/{user_id}/deduct-funds", post(wallet::deduct_funds))
        .route("/{user_id}/transactions", get(wallet::list_transactions))
        .route(
            "/{user_id}/transactions/export",
            get(wallet::export_transactions),
        )
        .route("/{user_id}/cash-out", post(wallet::request_cash_out))
}
