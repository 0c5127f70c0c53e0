//! End-to-end settlement run
//!
//! [`SettlementEngine`] chains the three stages for one group and currency:
//! expenses -> balances -> payments -> consolidated payments. Each stage
//! remains usable on its own; the engine only adds the currency guard on the
//! incoming expenses and stamps the result with a run id.

use core_kernel::{Currency, Money, SettlementRunId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::balance::{BalanceCalculator, Balances};
use crate::consolidator::TransactionConsolidator;
use crate::error::SettlementError;
use crate::expense::Expense;
use crate::policy::SettlementPolicy;
use crate::simplifier::DebtSimplifier;
use crate::transaction::Transaction;

/// Result of one settlement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Identifies the run for the caller's persistence
    pub run_id: SettlementRunId,
    pub currency: Currency,
    /// Net balances the payments were derived from
    pub balances: Balances,
    /// Payments that settle the balances
    pub transactions: Vec<Transaction>,
}

impl SettlementPlan {
    /// Total amount moved by all payments
    pub fn total_transferred(&self) -> Result<Money, SettlementError> {
        self.transactions
            .iter()
            .try_fold(Money::zero(self.currency), |acc, t| acc.checked_add(&t.amount))
            .map_err(SettlementError::from)
    }

    /// True if nobody needs to pay anybody
    pub fn is_settled(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Runs the full settlement pipeline
///
/// Holds only the immutable policy, so one engine can serve concurrent
/// runs for different groups.
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    policy: SettlementPolicy,
    calculator: BalanceCalculator,
    simplifier: DebtSimplifier,
    consolidator: TransactionConsolidator,
}

impl SettlementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SettlementPolicy) -> Self {
        Self {
            policy,
            calculator: BalanceCalculator::with_policy(policy),
            simplifier: DebtSimplifier::with_policy(policy),
            consolidator: TransactionConsolidator::with_policy(policy),
        }
    }

    /// Builds an engine from `SETTLEMENT_*` environment overrides
    pub fn from_env() -> Result<Self, SettlementError> {
        SettlementPolicy::from_env().map(Self::with_policy)
    }

    pub fn policy(&self) -> &SettlementPolicy {
        &self.policy
    }

    /// Settles a snapshot of expenses recorded in `currency`
    ///
    /// # Errors
    ///
    /// - `CurrencyMismatch` if any expense uses another currency
    /// - `InputInconsistency` if the expenses do not conserve money
    #[instrument(skip_all, fields(expenses = expenses.len(), currency = %currency))]
    pub fn settle(
        &self,
        expenses: &[Expense],
        currency: Currency,
    ) -> Result<SettlementPlan, SettlementError> {
        if let Some(expense) = expenses.iter().find(|e| e.currency() != currency) {
            return Err(SettlementError::CurrencyMismatch {
                expected: currency,
                found: expense.currency(),
            });
        }

        let balances = self.calculator.compute_balances(expenses);
        self.calculator.check_conservation(&balances)?;

        let transactions = self.simplifier.simplify_debts(&balances, currency)?;
        let transactions = self.consolidator.consolidate(&transactions)?;

        let plan = SettlementPlan {
            run_id: SettlementRunId::new_v7(),
            currency,
            balances,
            transactions,
        };
        info!(
            run_id = %plan.run_id,
            participants = plan.balances.len(),
            transactions = plan.transactions.len(),
            "Settlement plan ready"
        );
        Ok(plan)
    }
}
