//! Payment instructions produced by the settlement pipeline

use core_kernel::{Currency, Money, ParticipantId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SettlementError;

/// A single directed payment: `from` pays `amount` to `to`
///
/// The amount is always positive and carries the settlement currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    /// Paying participant (a debtor)
    pub from: ParticipantId,
    /// Receiving participant (a creditor)
    pub to: ParticipantId,
    /// Amount to pay
    pub amount: Money,
}

impl Transaction {
    /// Creates a validated transaction
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransaction` for a non-positive amount or when payer
    /// and payee are the same participant
    pub fn new(
        from: impl Into<ParticipantId>,
        to: impl Into<ParticipantId>,
        amount: Money,
    ) -> Result<Self, SettlementError> {
        let transaction = Self {
            from: from.into(),
            to: to.into(),
            amount,
        };
        transaction.validate()?;
        Ok(transaction)
    }

    /// Returns the currency of the payment
    pub fn currency(&self) -> Currency {
        self.amount.currency()
    }

    /// Checks the transaction invariants
    pub fn validate(&self) -> Result<(), SettlementError> {
        if !self.amount.is_positive() {
            return Err(SettlementError::InvalidTransaction(format!(
                "amount must be positive, got {} for {} -> {}",
                self.amount, self.from, self.to
            )));
        }
        if self.from == self.to {
            return Err(SettlementError::InvalidTransaction(format!(
                "{} cannot pay themselves",
                self.from
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}
