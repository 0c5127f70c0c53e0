//! Settlement policy: monetary tolerance and rounding
//!
//! Every stage of the pipeline shares one immutable [`SettlementPolicy`].
//! The defaults match minor-unit precision of two-decimal currencies; a
//! deployment can override them through `SETTLEMENT_*` environment variables.

use core_kernel::Currency;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SettlementError;

/// Default tolerance below which an amount counts as settled
pub const DEFAULT_EPSILON: Decimal = dec!(0.01);

/// Environment prefix read by [`SettlementPolicy::from_env`]
pub const ENV_PREFIX: &str = "SETTLEMENT";

/// Rounding applied to emitted transaction amounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 2.345 -> 2.35, -2.345 -> -2.35
    #[default]
    HalfAwayFromZero,
    /// Banker's rounding: 2.345 -> 2.34
    HalfEven,
    /// Truncation: 2.349 -> 2.34
    TowardZero,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::TowardZero => RoundingStrategy::ToZero,
        }
    }
}

/// Tolerance and rounding shared by all settlement stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementPolicy {
    /// Amounts with magnitude at or below this are treated as zero
    pub epsilon: Decimal,
    /// Rounding for emitted amounts
    pub rounding: RoundingMode,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            rounding: RoundingMode::default(),
        }
    }
}

impl SettlementPolicy {
    /// Creates a validated policy
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if epsilon is not in `(0, 1)`
    pub fn new(epsilon: Decimal, rounding: RoundingMode) -> Result<Self, SettlementError> {
        Self { epsilon, rounding }.validated()
    }

    /// Loads the policy from `SETTLEMENT_EPSILON` / `SETTLEMENT_ROUNDING`,
    /// keeping defaults for unset variables
    pub fn from_env() -> Result<Self, SettlementError> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| SettlementError::Configuration(e.to_string()))?;
        Self::from_config(&config)
    }

    /// Reads the policy out of an already assembled configuration
    pub fn from_config(config: &config::Config) -> Result<Self, SettlementError> {
        let policy: Self = config
            .clone()
            .try_deserialize()
            .map_err(|e| SettlementError::Configuration(e.to_string()))?;
        policy.validated()
    }

    fn validated(self) -> Result<Self, SettlementError> {
        if self.epsilon <= Decimal::ZERO || self.epsilon >= Decimal::ONE {
            return Err(SettlementError::Configuration(format!(
                "epsilon must be within (0, 1), got {}",
                self.epsilon
            )));
        }
        Ok(self)
    }

    /// True if `amount` is distinguishable from zero
    pub fn exceeds_epsilon(&self, amount: Decimal) -> bool {
        amount.abs() > self.epsilon
    }

    /// True if `amount` has fallen below the tolerance
    pub fn is_exhausted(&self, amount: Decimal) -> bool {
        amount.abs() < self.epsilon
    }

    /// Rounds an amount to the currency's minor unit
    pub fn round(&self, amount: Decimal, currency: Currency) -> Decimal {
        amount.round_dp_with_strategy(currency.decimal_places(), self.rounding.strategy())
    }
}
