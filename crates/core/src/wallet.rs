//! Wallet ledger vocabulary and cash-out lifecycle.

use crate::error::CoreError;
use crate::money;
use crate::types::Money;

/// Maximum length of a free-text transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Default wallet currency (ISO 4217).
pub const DEFAULT_CURRENCY: &str = "USD";

text_enum! {
    /// Direction of a ledger entry.
    pub enum TransactionKind("transaction kind") {
        Credit => "credit",
        Debit => "debit",
    }
}

text_enum! {
    /// State of a vendor's cash-out request.
    pub enum CashOutStatus("cash-out status") {
        Pending => "pending",
        Paid => "paid",
        Rejected => "rejected",
    }
}

impl TransactionKind {
    /// Balance after applying an entry of this kind.
    pub fn apply(self, balance: Money, amount: Money) -> Result<Money, CoreError> {
        match self {
            TransactionKind::Credit => money::credit(balance, amount),
            TransactionKind::Debit => money::debit(balance, amount),
        }
    }
}

impl CashOutStatus {
    /// Only pending requests may be processed; paid and rejected are final.
    pub fn ensure_pending(self) -> Result<(), CoreError> {
        if self == CashOutStatus::Pending {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Cash-out request is already {self}"
            )))
        }
    }
}

/// Validate an optional transaction description.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(d) = description {
        if d.len() > MAX_DESCRIPTION_LENGTH {
            return Err(CoreError::Validation(format!(
                "Description exceeds {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// A cash-out may not ask for more than the wallet currently holds.
pub fn validate_cash_out(balance: Money, amount: Money) -> Result<(), CoreError> {
    money::debit(balance, amount).map(|_| ())
}
