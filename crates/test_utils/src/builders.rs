//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and inherit defaults for the rest.

use core_kernel::{Currency, Money, ParticipantId};
use domain_settlement::{Balances, Expense, Split};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Builder for expenses that may deliberately break split invariants
///
/// Unlike [`Expense::builder`], this never validates, so tests can feed the
/// calculator malformed input such as duplicate or missing splits.
pub struct TestExpenseBuilder {
    payer: ParticipantId,
    total: Decimal,
    currency: Currency,
    splits: Vec<Split>,
}

impl Default for TestExpenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestExpenseBuilder {
    /// Creates a builder for a 100 PLN expense paid by "payer"
    pub fn new() -> Self {
        Self {
            payer: ParticipantId::from("payer"),
            total: dec!(100),
            currency: Currency::PLN,
            splits: Vec::new(),
        }
    }

    /// Sets the payer
    pub fn with_payer(mut self, payer: &str) -> Self {
        self.payer = ParticipantId::from(payer);
        self
    }

    /// Sets the total
    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total = total;
        self
    }

    /// Sets the currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Adds a split
    pub fn with_split(mut self, participant: &str, owed: Decimal) -> Self {
        self.splits.push(Split::new(participant, owed));
        self
    }

    /// Builds the expense
    pub fn build(self) -> Expense {
        Expense::new(self.payer, Money::new(self.total, self.currency), self.splits)
    }
}

/// Builder for literal balance maps
pub struct BalancesBuilder {
    currency: Currency,
    entries: Vec<(ParticipantId, Decimal)>,
}

impl BalancesBuilder {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            entries: Vec::new(),
        }
    }

    /// Adds a participant who owes `amount`
    pub fn owes(mut self, participant: &str, amount: Decimal) -> Self {
        self.entries.push((participant.into(), -amount));
        self
    }

    /// Adds a participant who is owed `amount`
    pub fn owed(mut self, participant: &str, amount: Decimal) -> Self {
        self.entries.push((participant.into(), amount));
        self
    }

    pub fn build(self) -> Balances {
        Balances::from_amounts(self.currency, self.entries)
    }
}
