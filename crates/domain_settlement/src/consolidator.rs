//! Coalescing of parallel payments
//!
//! Payments sharing the same ordered `(from, to)` pair are merged into one.
//! Opposite directions are never netted against each other and cycles such
//! as `A -> B -> C -> A` are left intact: this is duplicate-edge coalescing,
//! not cycle cancellation over the payment graph.

// TODO: net opposing edges and cancel cycles (min-cost-flow) once callers
// need fewer transfers than greedy matching already gives.

use core_kernel::{Money, ParticipantId};
use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::error::SettlementError;
use crate::policy::SettlementPolicy;
use crate::transaction::Transaction;

/// Merges duplicate same-direction payments
#[derive(Debug, Clone, Default)]
pub struct TransactionConsolidator {
    policy: SettlementPolicy,
}

impl TransactionConsolidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SettlementPolicy) -> Self {
        Self { policy }
    }

    /// Sums payments per ordered pair and drops pairs below epsilon
    ///
    /// Output keeps the order in which each pair first appeared, so
    /// consolidating an already consolidated list returns it unchanged.
    ///
    /// # Errors
    ///
    /// - `CurrencyMismatch` if the payments are not all in one currency
    /// - `InvalidTransaction` if a payment has a non-positive amount or
    ///   names the same participant on both ends
    #[instrument(skip_all, fields(transactions = transactions.len()))]
    pub fn consolidate(
        &self,
        transactions: &[Transaction],
    ) -> Result<Vec<Transaction>, SettlementError> {
        let Some(first) = transactions.first() else {
            return Ok(Vec::new());
        };
        let currency = first.currency();

        let mut merged: IndexMap<(ParticipantId, ParticipantId), Money> = IndexMap::new();
        for transaction in transactions {
            if transaction.currency() != currency {
                return Err(SettlementError::CurrencyMismatch {
                    expected: currency,
                    found: transaction.currency(),
                });
            }
            transaction.validate()?;

            let total = merged
                .entry((transaction.from.clone(), transaction.to.clone()))
                .or_insert_with(|| Money::zero(currency));
            *total = total.checked_add(&transaction.amount)?;
        }

        let consolidated: Vec<Transaction> = merged
            .into_iter()
            .filter(|(_, amount)| amount.amount() >= self.policy.epsilon)
            .map(|((from, to), amount)| Transaction { from, to, amount })
            .collect();

        debug!(
            before = transactions.len(),
            after = consolidated.len(),
            "Consolidated transactions"
        );
        Ok(consolidated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn tx(from: &str, to: &str, amount: Decimal) -> Transaction {
        Transaction::new(from, to, Money::new(amount, Currency::PLN)).unwrap()
    }

    #[test]
    fn test_merges_same_direction_only() {
        let consolidated = TransactionConsolidator::new()
            .consolidate(&[tx("A", "B", dec!(10)), tx("A", "B", dec!(5)), tx("B", "A", dec!(3))])
            .unwrap();

        assert_eq!(consolidated, vec![tx("A", "B", dec!(15)), tx("B", "A", dec!(3))]);
    }

    #[test]
    fn test_cycle_is_not_cancelled() {
        let cycle = [tx("A", "B", dec!(5)), tx("B", "C", dec!(5)), tx("C", "A", dec!(5))];
        let consolidated = TransactionConsolidator::new().consolidate(&cycle).unwrap();

        assert_eq!(consolidated, cycle.to_vec());
    }

    #[test]
    fn test_negligible_pairs_are_dropped() {
        let policy = SettlementPolicy::new(dec!(0.05), Default::default()).unwrap();
        let consolidated = TransactionConsolidator::with_policy(policy)
            .consolidate(&[tx("A", "B", dec!(0.02)), tx("A", "C", dec!(0.03)), tx("A", "C", dec!(0.03))])
            .unwrap();

        assert_eq!(consolidated, vec![tx("A", "C", dec!(0.06))]);
    }

    #[test]
    fn test_empty_input() {
        assert!(TransactionConsolidator::new().consolidate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_mixed_currencies() {
        let eur = Transaction::new("A", "B", Money::new(dec!(1), Currency::EUR)).unwrap();
        let result = TransactionConsolidator::new().consolidate(&[tx("A", "B", dec!(1)), eur]);

        assert_eq!(
            result,
            Err(SettlementError::CurrencyMismatch {
                expected: Currency::PLN,
                found: Currency::EUR,
            })
        );
    }

    #[test]
    fn test_rejects_malformed_transaction() {
        let bad = Transaction {
            from: "A".into(),
            to: "B".into(),
            amount: Money::new(dec!(-4), Currency::PLN),
        };
        let result = TransactionConsolidator::new().consolidate(&[bad]);
        assert!(matches!(result, Err(SettlementError::InvalidTransaction(_))));
    }
}
