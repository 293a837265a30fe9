//! Minor-unit money arithmetic.
//!
//! Amounts are integer cents. All arithmetic is checked so a corrupt balance
//! surfaces as an error instead of wrapping.

use crate::error::CoreError;
use crate::types::Money;

/// Largest single credit or debit accepted (10 million in major units).
pub const MAX_TRANSACTION_AMOUNT: Money = 1_000_000_000;

/// Validate a transaction amount: strictly positive and below the cap.
pub fn validate_amount(amount: Money) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    if amount > MAX_TRANSACTION_AMOUNT {
        return Err(CoreError::Validation(format!(
            "Amount must not exceed {}",
            format_minor(MAX_TRANSACTION_AMOUNT)
        )));
    }
    Ok(())
}

/// Balance after crediting `amount`.
pub fn credit(balance: Money, amount: Money) -> Result<Money, CoreError> {
    validate_amount(amount)?;
    balance
        .checked_add(amount)
        .ok_or_else(|| CoreError::Internal("Balance overflow".to_string()))
}

/// Balance after debiting `amount`. Fails when the balance would go negative.
pub fn debit(balance: Money, amount: Money) -> Result<Money, CoreError> {
    validate_amount(amount)?;
    if amount > balance {
        return Err(CoreError::InsufficientFunds {
            balance,
            requested: amount,
        });
    }
    Ok(balance - amount)
}

/// Render minor units as a decimal string: `1234` -> `"12.34"`, `-5` -> `"-0.05"`.
pub fn format_minor(amount: Money) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
