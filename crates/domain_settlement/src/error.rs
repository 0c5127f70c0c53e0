//! Settlement domain errors

use core_kernel::{Currency, MoneyError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the settlement domain
///
/// Both input-data kinds (`InputInconsistency`, `CurrencyMismatch`) are
/// returned to the caller as-is; nothing here is transient or retryable.
#[derive(Debug, Error, PartialEq)]
pub enum SettlementError {
    /// Money did not conserve: unmatched debt or credit remains
    #[error("Input inconsistency: unsettled debtor residue {debtor_residue}, creditor residue {creditor_residue}")]
    InputInconsistency {
        debtor_residue: Decimal,
        creditor_residue: Decimal,
    },

    /// Input spans more than one currency
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        expected: Currency,
        found: Currency,
    },

    /// Transaction violates its own invariants
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Expense could not be built
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),

    /// Settlement policy is out of range or could not be loaded
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Underlying money arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl SettlementError {
    pub(crate) fn inconsistency(debtor_residue: Decimal, creditor_residue: Decimal) -> Self {
        SettlementError::InputInconsistency {
            debtor_residue,
            creditor_residue,
        }
    }
}
