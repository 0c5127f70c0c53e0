//! Settlement Domain - who owes whom, and how to pay it back
//!
//! This crate turns a group's shared expenses into payment instructions in
//! three independent, stateless stages:
//!
//! - [`BalanceCalculator`] reduces expenses to one net balance per participant
//! - [`DebtSimplifier`] matches debtors with creditors greedily, emitting at
//!   most `N - 1` payments for `N` participants with a non-zero balance
//! - [`TransactionConsolidator`] merges duplicate same-direction payments
//!
//! [`SettlementEngine`] runs the whole pipeline for one currency.
//!
//! # Conservation
//!
//! A consistent set of expenses yields balances summing to zero. When they
//! do not, the stages report `InputInconsistency` instead of correcting the
//! data; the fault lies with the recorded expenses.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_settlement::{Expense, SettlementEngine};
//!
//! let dinner = Expense::builder("alice", Money::new(dec!(90), Currency::PLN))
//!     .split_equally(["alice", "bob", "carol"])
//!     .build()?;
//!
//! let plan = SettlementEngine::new().settle(&[dinner], Currency::PLN)?;
//! for payment in &plan.transactions {
//!     println!("{payment}");
//! }
//! ```

pub mod balance;
pub mod consolidator;
pub mod engine;
pub mod error;
pub mod expense;
pub mod policy;
pub mod simplifier;
pub mod transaction;

pub use balance::{BalanceCalculator, Balances};
pub use consolidator::TransactionConsolidator;
pub use engine::{SettlementEngine, SettlementPlan};
pub use error::SettlementError;
pub use expense::{Expense, ExpenseBuilder, Split};
pub use policy::{RoundingMode, SettlementPolicy, DEFAULT_EPSILON};
pub use simplifier::DebtSimplifier;
pub use transaction::Transaction;
