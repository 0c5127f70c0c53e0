//! Greedy debt simplification
//!
//! Turns a balance map into payment instructions by repeatedly matching the
//! largest outstanding debtor with the largest outstanding creditor.
//!
//! # Bounds
//!
//! Every matching step exhausts at least one side of the pair, so at most
//! `N - 1` transactions are emitted for `N` participants with a non-zero
//! balance. This is not the global minimum: finding the fewest transactions
//! means partitioning participants into zero-sum subgroups, which is
//! NP-hard in general and deliberately not attempted here.
//!
//! # Ordering
//!
//! Debtors and creditors are sorted once, largest amount first, with ties
//! broken by ascending participant id. The pair at the head of both lists is
//! matched until one side is exhausted and dropped; a partially settled head
//! keeps its place.

use core_kernel::{Currency, Money, ParticipantId};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::{debug, instrument, warn};

use crate::balance::Balances;
use crate::error::SettlementError;
use crate::policy::SettlementPolicy;
use crate::transaction::Transaction;

/// Working value for one side of the matching, local to a single run
#[derive(Debug)]
struct DebtEntry {
    participant: ParticipantId,
    remaining: Decimal,
}

impl DebtEntry {
    fn largest_first(a: &DebtEntry, b: &DebtEntry) -> Ordering {
        b.remaining
            .cmp(&a.remaining)
            .then_with(|| a.participant.cmp(&b.participant))
    }
}

/// Reduces balances to a short list of payments
#[derive(Debug, Clone, Default)]
pub struct DebtSimplifier {
    policy: SettlementPolicy,
}

impl DebtSimplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SettlementPolicy) -> Self {
        Self { policy }
    }

    /// Computes payments that settle `balances` in `currency`
    ///
    /// Participants within epsilon of zero are skipped. Emitted amounts are
    /// rounded to the currency's minor unit; the remaining amounts used for
    /// matching are left unrounded.
    ///
    /// # Errors
    ///
    /// - `CurrencyMismatch` if the balances were built from another currency
    /// - `InputInconsistency` if debt or credit is left over once one side
    ///   runs out, beyond epsilon plus the net of the near-zero balances
    ///   that were skipped, i.e. the balances did not sum to zero
    #[instrument(skip_all, fields(participants = balances.len(), currency = %currency))]
    pub fn simplify_debts(
        &self,
        balances: &Balances,
        currency: Currency,
    ) -> Result<Vec<Transaction>, SettlementError> {
        balances.ensure_currency(currency)?;

        let (mut debtors, mut creditors, dust) = self.partition(balances);
        debtors.sort_by(DebtEntry::largest_first);
        creditors.sort_by(DebtEntry::largest_first);

        let active = debtors.len() + creditors.len();
        let mut transactions = Vec::with_capacity(active.saturating_sub(1));
        let (mut d, mut c) = (0, 0);

        while d < debtors.len() && c < creditors.len() {
            let debtor = &mut debtors[d];
            let creditor = &mut creditors[c];
            let settle = debtor.remaining.min(creditor.remaining);

            if settle > self.policy.epsilon {
                let amount = self.policy.round(settle, currency);
                // Zero-decimal currencies can round a sub-unit settle away
                if amount > Decimal::ZERO {
                    transactions.push(Transaction {
                        from: debtor.participant.clone(),
                        to: creditor.participant.clone(),
                        amount: Money::new(amount, currency),
                    });
                }
            }

            debtor.remaining -= settle;
            creditor.remaining -= settle;

            if self.policy.is_exhausted(debtor.remaining) {
                d += 1;
            }
            if self.policy.is_exhausted(creditor.remaining) {
                c += 1;
            }
        }

        let debtor_residue: Decimal = debtors[d..].iter().map(|e| e.remaining).sum();
        let creditor_residue: Decimal = creditors[c..].iter().map(|e| e.remaining).sum();
        // Skipped near-zero balances leave exactly their net sum unmatched
        let tolerance = self.policy.epsilon + dust.abs();
        if debtor_residue > tolerance || creditor_residue > tolerance {
            warn!(%debtor_residue, %creditor_residue, "Unsettled residue after simplification");
            return Err(SettlementError::inconsistency(debtor_residue, creditor_residue));
        }

        debug_assert!(transactions.len() <= active.saturating_sub(1));
        debug!(active, transactions = transactions.len(), "Simplified debts");
        Ok(transactions)
    }

    /// Splits balances into debtors and creditors, also returning the signed
    /// sum of balances skipped as already settled
    fn partition(&self, balances: &Balances) -> (Vec<DebtEntry>, Vec<DebtEntry>, Decimal) {
        let mut debtors = Vec::new();
        let mut creditors = Vec::new();
        let mut dust = Decimal::ZERO;

        for (participant, balance) in balances.iter() {
            if !self.policy.exceeds_epsilon(balance) {
                dust += balance;
                continue;
            }
            let entry = DebtEntry {
                participant: participant.clone(),
                remaining: balance.abs(),
            };
            if balance.is_sign_negative() {
                debtors.push(entry);
            } else {
                creditors.push(entry);
            }
        }

        (debtors, creditors, dust)
    }
}
