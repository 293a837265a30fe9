//! Error type for repository operations that make domain decisions inside a
//! database transaction (wallet movements, order placement, approvals).

use marketplace_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A domain rule rejected the operation; the transaction was rolled back.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
