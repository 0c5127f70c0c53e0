//! Custom Test Assertions
//!
//! Specialized assertion helpers for settlement types that give more
//! meaningful failure messages than standard assertions.

use core_kernel::Money;
use domain_settlement::{Balances, SettlementPolicy, Transaction};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts a single payment's endpoints and amount
pub fn assert_transaction(transaction: &Transaction, from: &str, to: &str, amount: Decimal) {
    assert_eq!(
        (transaction.from.as_str(), transaction.to.as_str(), transaction.amount.amount()),
        (from, to, amount),
        "Unexpected transaction {}",
        transaction
    );
}

/// Asserts that applying `transactions` leaves every participant within epsilon of zero
pub fn assert_all_settled(balances: &Balances, transactions: &[Transaction], policy: &SettlementPolicy) {
    let after = balances
        .apply(transactions)
        .unwrap_or_else(|e| panic!("Transactions could not be applied: {e}"));

    let unsettled: Vec<String> = after
        .iter()
        .filter(|(_, amount)| policy.exceeds_epsilon(*amount))
        .map(|(participant, amount)| format!("{participant}={amount}"))
        .collect();

    assert!(
        unsettled.is_empty(),
        "Participants left unsettled: {}",
        unsettled.join(", ")
    );
}

/// Asserts that balances sum to zero within epsilon
pub fn assert_conserved(balances: &Balances, policy: &SettlementPolicy) {
    let total = balances.total();
    assert!(
        !policy.exceeds_epsilon(total),
        "Balances do not conserve money: sum={}",
        total
    );
}
