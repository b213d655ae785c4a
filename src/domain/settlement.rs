//! Settlement obligations: who owes whom after a question resolves.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::id::{ParticipantId, QuestionId};
use super::money::{checked_add, Amount};

/// Status of a settlement obligation.
///
/// `Pending` moves to `Completed` or `Disputed`; both are terminal here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationStatus {
    Pending,
    Completed,
    Disputed,
}

impl fmt::Display for ObligationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Disputed => "disputed",
        };
        f.write_str(label)
    }
}

/// Storage key of an obligation: one per ordered pair per question.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObligationKey {
    pub payer: ParticipantId,
    pub payee: ParticipantId,
    pub question_id: QuestionId,
}

impl fmt::Display for ObligationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.payer, self.payee, self.question_id)
    }
}

/// A debt from one participant to another arising from a resolved question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementObligation {
    payer: ParticipantId,
    payee: ParticipantId,
    amount: Amount,
    question_id: QuestionId,
    status: ObligationStatus,
}

impl SettlementObligation {
    /// Create a pending obligation.
    pub fn try_new(
        payer: ParticipantId,
        payee: ParticipantId,
        amount: Amount,
        question_id: QuestionId,
    ) -> Result<Self, ValidationError> {
        let obligation = Self {
            payer,
            payee,
            amount,
            question_id,
            status: ObligationStatus::Pending,
        };
        obligation.validate()?;
        Ok(obligation)
    }

    /// Check the structural invariants of an obligation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.payer == self.payee {
            return Err(ValidationError::SelfObligation {
                participant_id: self.payer.clone(),
            });
        }
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount {
                amount: self.amount,
            });
        }
        Ok(())
    }

    /// Get the paying participant.
    #[must_use]
    pub fn payer(&self) -> &ParticipantId {
        &self.payer
    }

    /// Get the receiving participant.
    #[must_use]
    pub fn payee(&self) -> &ParticipantId {
        &self.payee
    }

    /// Get the amount owed.
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Get the originating question.
    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> ObligationStatus {
        self.status
    }

    /// Build the storage key for this obligation.
    #[must_use]
    pub fn key(&self) -> ObligationKey {
        ObligationKey {
            payer: self.payer.clone(),
            payee: self.payee.clone(),
            question_id: self.question_id.clone(),
        }
    }

    /// Returns true if `participant` is the payer or payee.
    #[must_use]
    pub fn involves(&self, participant: &ParticipantId) -> bool {
        &self.payer == participant || &self.payee == participant
    }

    /// Mark the obligation as paid.
    pub fn complete(&mut self) -> Result<(), ValidationError> {
        self.transition(ObligationStatus::Completed)
    }

    /// Flag the obligation as disputed.
    pub fn dispute(&mut self) -> Result<(), ValidationError> {
        self.transition(ObligationStatus::Disputed)
    }

    /// Apply a status change; repeating the current status is a no-op.
    pub fn transition(&mut self, to: ObligationStatus) -> Result<(), ValidationError> {
        if self.status == to {
            return Ok(());
        }
        if self.status != ObligationStatus::Pending || to == ObligationStatus::Pending {
            return Err(ValidationError::InvalidTransition {
                entity: "obligation",
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Net position per participant: receivables minus payables.
///
/// Disputed obligations are left out; pending and completed both count.
pub fn net_balances(
    obligations: &[SettlementObligation],
) -> Result<BTreeMap<ParticipantId, Amount>, ValidationError> {
    let mut balances: BTreeMap<ParticipantId, Amount> = BTreeMap::new();
    for obligation in obligations
        .iter()
        .filter(|o| o.status != ObligationStatus::Disputed)
    {
        let payee = balances
            .entry(obligation.payee.clone())
            .or_insert(Decimal::ZERO);
        *payee = checked_add(*payee, obligation.amount, "net balance")?;
        let payer = balances
            .entry(obligation.payer.clone())
            .or_insert(Decimal::ZERO);
        *payer = checked_add(*payer, -obligation.amount, "net balance")?;
    }
    Ok(balances)
}
