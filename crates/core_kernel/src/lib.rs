//! Core Kernel - Foundational types for the settlement system
//!
//! This crate provides the building blocks shared by the settlement domain:
//! - Money types with precise decimal arithmetic
//! - Open currency codes with minor-unit precision
//! - Common identifiers

pub mod money;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{ParticipantId, ExpenseId, SettlementRunId};
pub use error::CoreError;
