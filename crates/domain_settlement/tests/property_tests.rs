//! Property tests for the settlement pipeline
//!
//! Generated expenses and balances are kept in whole minor units, matching
//! how the surrounding service records money.

use core_kernel::Currency;
use proptest::prelude::*;

use domain_settlement::{
    BalanceCalculator, DebtSimplifier, SettlementEngine, SettlementError, SettlementPolicy,
    TransactionConsolidator,
};
use test_utils::{assert_all_settled, balances_strategy, expenses_strategy};

proptest! {
    #[test]
    fn balances_conserve_money(expenses in expenses_strategy(Currency::PLN)) {
        let balances = BalanceCalculator::new().compute_balances(&expenses);
        let policy = SettlementPolicy::default();

        prop_assert!(!policy.exceeds_epsilon(balances.total()), "sum = {}", balances.total());
    }

    #[test]
    fn simplification_emits_at_most_n_minus_one(balances in balances_strategy(Currency::PLN)) {
        let policy = SettlementPolicy::default();
        let nonzero = balances.nonzero_count(&policy);
        let transactions = DebtSimplifier::new().simplify_debts(&balances, Currency::PLN).unwrap();

        prop_assert!(transactions.len() <= nonzero.saturating_sub(1));
        prop_assert!(transactions.iter().all(|t| t.amount.is_positive()));
    }

    #[test]
    fn simplification_settles_everybody(balances in balances_strategy(Currency::PLN)) {
        let policy = SettlementPolicy::default();
        let transactions = DebtSimplifier::new().simplify_debts(&balances, Currency::PLN).unwrap();

        assert_all_settled(&balances, &transactions, &policy);
    }

    #[test]
    fn consolidation_is_idempotent(expenses in expenses_strategy(Currency::PLN)) {
        let simplifier = DebtSimplifier::new();
        let consolidator = TransactionConsolidator::new();

        // Settle every expense separately so the same pairs repeat
        let mut transactions = Vec::new();
        for expense in &expenses {
            let balances = BalanceCalculator::new().compute_balances(std::slice::from_ref(expense));
            transactions.extend(simplifier.simplify_debts(&balances, Currency::PLN).unwrap());
        }

        let once = consolidator.consolidate(&transactions).unwrap();
        let twice = consolidator.consolidate(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn engine_plan_settles_generated_expenses(expenses in expenses_strategy(Currency::PLN)) {
        let engine = SettlementEngine::new();
        let plan = engine.settle(&expenses, Currency::PLN).unwrap();

        assert_all_settled(&plan.balances, &plan.transactions, engine.policy());
    }

    #[test]
    fn foreign_currency_is_always_rejected(balances in balances_strategy(Currency::EUR)) {
        let result = DebtSimplifier::new().simplify_debts(&balances, Currency::PLN);

        let is_mismatch = matches!(result, Err(SettlementError::CurrencyMismatch { .. }));
        prop_assert!(is_mismatch);
    }
}
