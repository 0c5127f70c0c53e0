//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating expenses and balances that
//! keep the domain invariants the pipeline relies on.

use core_kernel::{Currency, Money, ParticipantId};
use domain_settlement::{Balances, Expense, Split};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Number of distinct participants generators draw from
pub const PARTICIPANT_POOL: usize = 8;

/// Strategy for generating a participant id from a small fixed pool
pub fn participant_strategy() -> impl Strategy<Value = ParticipantId> {
    (0..PARTICIPANT_POOL).prop_map(|i| ParticipantId::from(format!("p{i}")))
}

/// Strategy for generating positive amounts in minor units
///
/// Starts at 10.00 so that no weighted share lands within one minor unit
/// of zero, where it would be treated as already settled.
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1_000i64..10_000_000i64
}

/// Strategy for generating a consistent expense in `currency`
///
/// The total is split across 1..=5 participants with integer weights, so
/// the splits sum to the total exactly. The payer may be among them.
pub fn expense_strategy(currency: Currency) -> impl Strategy<Value = Expense> {
    (
        participant_strategy(),
        positive_amount_minor_strategy(),
        proptest::collection::vec((participant_strategy(), 1u32..10u32), 1..=5),
    )
        .prop_map(move |(payer, minor, shares)| {
            let total = Money::from_minor(minor, currency);
            let ratios: Vec<Decimal> = shares.iter().map(|(_, w)| Decimal::from(*w)).collect();
            let parts = total
                .allocate_by_ratios(&ratios)
                .expect("weights are positive");
            let splits = shares
                .into_iter()
                .zip(parts)
                .map(|((participant, _), share)| Split::new(participant, share.amount()))
                .collect();
            Expense::new(payer, total, splits)
        })
}

/// Strategy for generating a list of consistent expenses
pub fn expenses_strategy(currency: Currency) -> impl Strategy<Value = Vec<Expense>> {
    proptest::collection::vec(expense_strategy(currency), 0..30)
}

/// Strategy for generating zero-sum balances in whole minor units
///
/// Amounts are even so none sits exactly one minor unit from zero. The last
/// participant absorbs whatever makes the map sum to zero.
pub fn balances_strategy(currency: Currency) -> impl Strategy<Value = Balances> {
    let even = (-500_000i64..500_000i64).prop_map(|half| half * 2);
    proptest::collection::vec(even, 1..12).prop_map(move |amounts| {
        let closing: i64 = -amounts.iter().sum::<i64>();
        let entries = amounts
            .into_iter()
            .chain(std::iter::once(closing))
            .enumerate()
            .map(|(i, minor)| {
                (
                    ParticipantId::from(format!("m{i:02}")),
                    Money::from_minor(minor, currency).amount(),
                )
            });
        Balances::from_amounts(currency, entries)
    })
}
