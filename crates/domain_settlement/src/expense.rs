//! Expense records and their per-participant splits

use core_kernel::{Currency, ExpenseId, Money, ParticipantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SettlementError;

/// The amount one participant owes for one expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub participant: ParticipantId,
    pub owed: Decimal,
}

impl Split {
    pub fn new(participant: impl Into<ParticipantId>, owed: Decimal) -> Self {
        Self {
            participant: participant.into(),
            owed,
        }
    }
}

/// A shared expense paid by one participant
///
/// The splits are expected to sum to `total`. This is not enforced; see
/// [`Expense::is_consistent`]. The payer may appear in their own splits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub payer: ParticipantId,
    pub total: Money,
    pub splits: Vec<Split>,
}

impl Expense {
    pub fn new(payer: impl Into<ParticipantId>, total: Money, splits: Vec<Split>) -> Self {
        Self {
            id: ExpenseId::new_v7(),
            payer: payer.into(),
            total,
            splits,
        }
    }

    /// Starts a builder for an expense paid by `payer`
    pub fn builder(payer: impl Into<ParticipantId>, total: Money) -> ExpenseBuilder {
        ExpenseBuilder::new(payer, total)
    }

    pub fn currency(&self) -> Currency {
        self.total.currency()
    }

    /// Sum of all split amounts
    pub fn splits_total(&self) -> Decimal {
        self.splits.iter().map(|s| s.owed).sum()
    }

    /// `total - splits_total`; zero for a well-formed expense
    pub fn discrepancy(&self) -> Decimal {
        self.total.amount() - self.splits_total()
    }

    /// True if the splits account for the total within `epsilon`
    pub fn is_consistent(&self, epsilon: Decimal) -> bool {
        self.discrepancy().abs() <= epsilon
    }

    /// Payer followed by split participants, in record order
    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        std::iter::once(&self.payer).chain(self.splits.iter().map(|s| &s.participant))
    }
}

/// Builder for [`Expense`] with exact and allocated splits
///
/// Allocation helpers distribute in minor units, so their splits always sum
/// to the expense total exactly.
#[derive(Debug)]
pub struct ExpenseBuilder {
    id: Option<ExpenseId>,
    payer: ParticipantId,
    total: Money,
    splits: Vec<Split>,
    error: Option<SettlementError>,
}

impl ExpenseBuilder {
    pub fn new(payer: impl Into<ParticipantId>, total: Money) -> Self {
        Self {
            id: None,
            payer: payer.into(),
            total,
            splits: Vec::new(),
            error: None,
        }
    }

    /// Uses a known id instead of generating one
    pub fn id(mut self, id: ExpenseId) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds an explicit split
    pub fn split(mut self, participant: impl Into<ParticipantId>, owed: Decimal) -> Self {
        let participant = participant.into();
        if owed < Decimal::ZERO {
            self.fail(SettlementError::InvalidExpense(format!(
                "split for {} is negative: {}",
                participant, owed
            )));
        }
        self.splits.push(Split::new(participant, owed));
        self
    }

    /// Splits the total equally; earlier participants absorb the remainder cents
    pub fn split_equally<I, P>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        let participants: Vec<ParticipantId> = participants.into_iter().map(Into::into).collect();
        let parts = u32::try_from(participants.len())
            .map_err(|_| SettlementError::InvalidExpense("too many participants".to_string()))
            .and_then(|n| self.total.allocate(n).map_err(SettlementError::from));

        match parts {
            Ok(parts) => {
                for (participant, share) in participants.into_iter().zip(parts) {
                    self.splits.push(Split::new(participant, share.amount()));
                }
            }
            Err(e) => self.fail(e),
        }
        self
    }

    /// Splits the total proportionally to the given weights
    pub fn split_by_weights<I, P>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = (P, Decimal)>,
        P: Into<ParticipantId>,
    {
        let (participants, ratios): (Vec<ParticipantId>, Vec<Decimal>) =
            weights.into_iter().map(|(p, w)| (p.into(), w)).unzip();

        match self.total.allocate_by_ratios(&ratios) {
            Ok(parts) => {
                for (participant, share) in participants.into_iter().zip(parts) {
                    self.splits.push(Split::new(participant, share.amount()));
                }
            }
            Err(e) => self.fail(e.into()),
        }
        self
    }

    fn fail(&mut self, error: SettlementError) {
        self.error.get_or_insert(error);
    }

    /// Builds the expense
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by a split method, or
    /// `InvalidExpense` if no splits were given or a participant id is blank
    pub fn build(self) -> Result<Expense, SettlementError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.splits.is_empty() {
            return Err(SettlementError::InvalidExpense(format!(
                "expense paid by {} has no splits",
                self.payer
            )));
        }
        let ids = std::iter::once(&self.payer).chain(self.splits.iter().map(|s| &s.participant));
        for id in ids {
            ParticipantId::new(id.as_str())
                .map_err(|e| SettlementError::InvalidExpense(e.to_string()))?;
        }

        Ok(Expense {
            id: self.id.unwrap_or_else(ExpenseId::new_v7),
            payer: self.payer,
            total: self.total,
            splits: self.splits,
        })
    }
}
