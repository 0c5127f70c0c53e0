//! Pre-built Test Fixtures
//!
//! Ready-to-use balances and expenses for the scenarios the settlement
//! pipeline is specified against.

use core_kernel::{Currency, Money};
use domain_settlement::{Balances, Expense};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn pln(amount: Decimal) -> Money {
        Money::new(amount, Currency::PLN)
    }

    pub fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }
}

/// Fixture for balance maps
pub struct BalanceFixtures;

impl BalanceFixtures {
    /// Two debtors owing one creditor: `{A: -30, B: -20, C: 50}`
    pub fn two_debtors_one_creditor() -> Balances {
        Balances::from_amounts(
            Currency::PLN,
            [("A", dec!(-30)), ("B", dec!(-20)), ("C", dec!(50))],
        )
    }

    /// One debtor owing two equal creditors: `{A: -10, B: 5, C: 5}`
    pub fn one_debtor_equal_creditors() -> Balances {
        Balances::from_amounts(
            Currency::PLN,
            [("A", dec!(-10)), ("B", dec!(5)), ("C", dec!(5))],
        )
    }

    /// Everybody already even
    pub fn settled() -> Balances {
        Balances::from_amounts(
            Currency::PLN,
            [("A", dec!(0)), ("B", dec!(0.005)), ("C", dec!(-0.005))],
        )
    }
}

/// Fixture for expense sets
pub struct ExpenseFixtures;

impl ExpenseFixtures {
    /// A weekend trip: one shared lodging, dinner, and a fuel stop
    pub fn weekend_trip() -> Vec<Expense> {
        vec![
            Expense::builder("anna", MoneyFixtures::pln(dec!(600)))
                .split_equally(["anna", "bartek", "celina", "darek"])
                .build()
                .expect("valid lodging expense"),
            Expense::builder("bartek", MoneyFixtures::pln(dec!(200)))
                .split("anna", dec!(50))
                .split("bartek", dec!(80))
                .split("celina", dec!(70))
                .build()
                .expect("valid dinner expense"),
            Expense::builder("celina", MoneyFixtures::pln(dec!(100)))
                .split_by_weights([("bartek", dec!(1)), ("darek", dec!(3))])
                .build()
                .expect("valid fuel expense"),
        ]
    }

    /// An expense whose splits only cover part of the total
    pub fn under_split() -> Expense {
        Expense::builder("anna", MoneyFixtures::pln(dec!(50)))
            .split("bartek", dec!(20))
            .build()
            .expect("builder accepts under-split expenses")
    }
}
