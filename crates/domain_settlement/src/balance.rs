//! Net balances and the calculator that derives them from expenses
//!
//! A balance is positive when the participant is owed money and negative
//! when they owe money. For a consistent set of expenses the balances sum
//! to zero, since each expense credits its payer with exactly the amount
//! its splits debit.

use core_kernel::{Currency, ParticipantId};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument, warn};

use crate::error::SettlementError;
use crate::expense::Expense;
use crate::policy::SettlementPolicy;
use crate::transaction::Transaction;

/// Net signed amount per participant
///
/// Entries keep the order in which participants first appeared. The set of
/// currencies that contributed is tracked so later stages can refuse to net
/// across currencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    entries: IndexMap<ParticipantId, Decimal>,
    currencies: BTreeSet<Currency>,
}

impl Balances {
    /// Creates an empty balance map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds balances from literal amounts in one currency
    ///
    /// Repeated participants are summed.
    pub fn from_amounts<I, P>(currency: Currency, amounts: I) -> Self
    where
        I: IntoIterator<Item = (P, Decimal)>,
        P: Into<ParticipantId>,
    {
        let mut balances = Self::new();
        balances.currencies.insert(currency);
        for (participant, amount) in amounts {
            balances.adjust(participant.into(), amount);
        }
        balances
    }

    fn touch(&mut self, participant: &ParticipantId) {
        if !self.entries.contains_key(participant) {
            self.entries.insert(participant.clone(), Decimal::ZERO);
        }
    }

    fn adjust(&mut self, participant: ParticipantId, delta: Decimal) {
        *self.entries.entry(participant).or_insert(Decimal::ZERO) += delta;
    }

    /// Balance of one participant, if they appear at all
    pub fn get(&self, participant: &ParticipantId) -> Option<Decimal> {
        self.entries.get(participant).copied()
    }

    /// Iterates in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, Decimal)> {
        self.entries.iter().map(|(participant, amount)| (participant, *amount))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Currencies of the expenses or transactions folded into these balances
    pub fn currencies(&self) -> &BTreeSet<Currency> {
        &self.currencies
    }

    /// Sum of all balances; zero when money is conserved
    pub fn total(&self) -> Decimal {
        self.entries.values().sum()
    }

    /// Number of participants whose balance is distinguishable from zero
    pub fn nonzero_count(&self, policy: &SettlementPolicy) -> usize {
        self.entries
            .values()
            .filter(|amount| policy.exceeds_epsilon(**amount))
            .count()
    }

    /// True if every balance is within tolerance of zero
    pub fn is_settled(&self, policy: &SettlementPolicy) -> bool {
        self.nonzero_count(policy) == 0
    }

    /// Fails unless every contributing currency is `currency`
    pub fn ensure_currency(&self, currency: Currency) -> Result<(), SettlementError> {
        match self.currencies.iter().find(|c| **c != currency) {
            Some(found) => Err(SettlementError::CurrencyMismatch {
                expected: currency,
                found: *found,
            }),
            None => Ok(()),
        }
    }

    /// Returns the balances after the given payments were made
    ///
    /// A payment raises the payer's balance and lowers the payee's, so
    /// applying a complete settlement brings every balance to zero.
    ///
    /// # Errors
    ///
    /// `CurrencyMismatch` if a payment is in a currency other than the
    /// balances', `InvalidTransaction` if a payment is malformed
    pub fn apply(&self, transactions: &[Transaction]) -> Result<Balances, SettlementError> {
        let mut settled = self.clone();
        for transaction in transactions {
            transaction.validate()?;
            settled.ensure_currency(transaction.currency())?;
            settled.currencies.insert(transaction.currency());

            let amount = transaction.amount.amount();
            settled.adjust(transaction.from.clone(), amount);
            settled.adjust(transaction.to.clone(), -amount);
        }
        Ok(settled)
    }
}

impl<'a> IntoIterator for &'a Balances {
    type Item = (&'a ParticipantId, &'a Decimal);
    type IntoIter = indexmap::map::Iter<'a, ParticipantId, Decimal>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Reduces expenses to one net balance per participant
#[derive(Debug, Clone, Default)]
pub struct BalanceCalculator {
    policy: SettlementPolicy,
}

impl BalanceCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SettlementPolicy) -> Self {
        Self { policy }
    }

    /// Computes net balances for a set of expenses
    ///
    /// Every payer and split participant gets an entry, starting at zero.
    /// Each expense credits its payer with the total and debits every split
    /// participant with their share; duplicate splits are simply summed.
    /// Expenses whose splits do not add up are logged, never rejected.
    #[instrument(skip_all, fields(expenses = expenses.len()))]
    pub fn compute_balances(&self, expenses: &[Expense]) -> Balances {
        let mut balances = Balances::new();

        for expense in expenses {
            for participant in expense.participants() {
                balances.touch(participant);
            }
            balances.currencies.insert(expense.currency());

            if !expense.is_consistent(self.policy.epsilon) {
                warn!(
                    expense_id = %expense.id,
                    total = %expense.total,
                    splits_total = %expense.splits_total(),
                    "Expense splits do not sum to its total"
                );
            }

            balances.adjust(expense.payer.clone(), expense.total.amount());
            for split in &expense.splits {
                balances.adjust(split.participant.clone(), -split.owed);
            }
        }

        if balances.currencies.len() > 1 {
            warn!(currencies = ?balances.currencies, "Balances mix several currencies");
        }
        debug!(participants = balances.len(), "Computed balances");
        balances
    }

    /// Checks that the balances sum to zero within tolerance
    ///
    /// # Errors
    ///
    /// `InputInconsistency` carrying the surplus on the side that does not
    /// net out
    pub fn check_conservation(&self, balances: &Balances) -> Result<(), SettlementError> {
        let residue = balances.total();
        if !self.policy.exceeds_epsilon(residue) {
            return Ok(());
        }

        warn!(%residue, "Balances do not conserve money");
        if residue.is_sign_negative() {
            Err(SettlementError::inconsistency(-residue, Decimal::ZERO))
        } else {
            Err(SettlementError::inconsistency(Decimal::ZERO, residue))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::Split;
    use core_kernel::Money;
    use rust_decimal_macros::dec;

    fn expense(payer: &str, total: Decimal, splits: &[(&str, Decimal)]) -> Expense {
        Expense::new(
            payer,
            Money::new(total, Currency::PLN),
            splits.iter().map(|(p, owed)| Split::new(*p, *owed)).collect(),
        )
    }

    #[test]
    fn test_payer_in_own_split_is_netted() {
        let calculator = BalanceCalculator::new();
        let balances = calculator.compute_balances(&[expense(
            "A",
            dec!(90),
            &[("A", dec!(30)), ("B", dec!(30)), ("C", dec!(30))],
        )]);

        assert_eq!(balances.get(&"A".into()), Some(dec!(60)));
        assert_eq!(balances.get(&"B".into()), Some(dec!(-30)));
        assert_eq!(balances.get(&"C".into()), Some(dec!(-30)));
        assert_eq!(balances.total(), dec!(0));
    }

    #[test]
    fn test_first_appearance_order() {
        let calculator = BalanceCalculator::new();
        let balances = calculator.compute_balances(&[
            expense("C", dec!(10), &[("B", dec!(10))]),
            expense("A", dec!(10), &[("C", dec!(10))]),
        ]);

        let order: Vec<&str> = balances.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(order, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_duplicate_splits_are_summed() {
        let calculator = BalanceCalculator::new();
        let balances = calculator.compute_balances(&[expense(
            "A",
            dec!(20),
            &[("B", dec!(5)), ("B", dec!(15))],
        )]);

        assert_eq!(balances.get(&"B".into()), Some(dec!(-20)));
        assert!(calculator.check_conservation(&balances).is_ok());
    }

    #[test]
    fn test_zero_participants_are_kept() {
        let calculator = BalanceCalculator::new();
        let balances = calculator.compute_balances(&[expense("A", dec!(10), &[("A", dec!(10))])]);

        assert_eq!(balances.len(), 1);
        assert_eq!(balances.get(&"A".into()), Some(dec!(0)));
        assert!(balances.is_settled(&SettlementPolicy::default()));
    }

    #[test]
    fn test_conservation_violation() {
        let calculator = BalanceCalculator::new();
        let balances = calculator.compute_balances(&[expense("A", dec!(50), &[("B", dec!(20))])]);

        assert_eq!(
            calculator.check_conservation(&balances),
            Err(SettlementError::InputInconsistency {
                debtor_residue: dec!(0),
                creditor_residue: dec!(30),
            })
        );
    }

    #[test]
    fn test_apply_settles_balances() {
        let balances = Balances::from_amounts(Currency::PLN, [("A", dec!(-30)), ("C", dec!(30))]);
        let payment = Transaction::new("A", "C", Money::new(dec!(30), Currency::PLN)).unwrap();

        let settled = balances.apply(&[payment]).unwrap();
        assert_eq!(settled.get(&"A".into()), Some(dec!(0)));
        assert_eq!(settled.get(&"C".into()), Some(dec!(0)));
    }

    #[test]
    fn test_apply_rejects_other_currency() {
        let balances = Balances::from_amounts(Currency::PLN, [("A", dec!(-1)), ("B", dec!(1))]);
        let payment = Transaction::new("A", "B", Money::new(dec!(1), Currency::EUR)).unwrap();

        assert!(matches!(
            balances.apply(&[payment]),
            Err(SettlementError::CurrencyMismatch { .. })
        ));
    }
}
