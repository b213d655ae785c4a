//! Bets placed by participants on questions.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::id::{BetId, EventId, ParticipantId, QuestionId};
use super::money::Amount;

/// Status of a bet.
///
/// A bet starts `Active`, moves to `Won` or `Lost` exactly once at
/// resolution, and becomes `Settled` when every obligation tied to it
/// has been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Active,
    Won,
    Lost,
    Settled,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Settled => "settled",
        };
        f.write_str(label)
    }
}

/// Outcome of a resolved bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// A single participant's wager on one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    id: BetId,
    participant_id: ParticipantId,
    question_id: QuestionId,
    event_id: EventId,
    chosen_answer: String,
    stake: Amount,
    status: BetStatus,
    #[serde(default)]
    realized_winnings: Option<Amount>,
    created_at: DateTime<Utc>,
}

impl Bet {
    /// Create a new active bet.
    ///
    /// Whether the answer fits the question is checked at placement,
    /// where the question is known.
    pub fn try_new(
        id: BetId,
        participant_id: ParticipantId,
        question_id: QuestionId,
        event_id: EventId,
        chosen_answer: impl Into<String>,
        stake: Amount,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let bet = Self {
            id,
            participant_id,
            question_id,
            event_id,
            chosen_answer: chosen_answer.into(),
            stake,
            status: BetStatus::Active,
            realized_winnings: None,
            created_at,
        };
        bet.validate()?;
        Ok(bet)
    }

    /// Check the structural invariants of a bet.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stake <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveStake { stake: self.stake });
        }
        if self.chosen_answer.trim().is_empty() {
            return Err(ValidationError::EmptyAnswer);
        }
        match (self.status, self.realized_winnings) {
            (BetStatus::Active, None) => Ok(()),
            (BetStatus::Active, Some(_)) | (_, None) => Err(ValidationError::InvalidTransition {
                entity: "bet",
                from: self.status.to_string(),
                to: "inconsistent winnings".into(),
            }),
            (_, Some(winnings)) if winnings < Decimal::ZERO => {
                Err(ValidationError::NonPositiveAmount { amount: winnings })
            }
            _ => Ok(()),
        }
    }

    /// Get the bet ID.
    #[must_use]
    pub fn id(&self) -> &BetId {
        &self.id
    }

    /// Get the owning participant.
    #[must_use]
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    /// Get the question this bet is on.
    #[must_use]
    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    /// Get the event the question belongs to.
    #[must_use]
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Get the chosen answer.
    #[must_use]
    pub fn chosen_answer(&self) -> &str {
        &self.chosen_answer
    }

    /// Get the stake.
    #[must_use]
    pub fn stake(&self) -> Amount {
        self.stake
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> BetStatus {
        self.status
    }

    /// Realized winnings; `None` until resolved, zero for a lost bet.
    #[must_use]
    pub fn realized_winnings(&self) -> Option<Amount> {
        self.realized_winnings
    }

    /// Get when the bet was placed.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true once the bet has been resolved (won, lost or settled).
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status != BetStatus::Active
    }

    /// Outcome of a resolved bet.
    ///
    /// Settled bets keep their winnings, and a winning bet always returns
    /// at least its positive stake, so positive winnings mean a win.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            BetStatus::Active => None,
            BetStatus::Won => Some(Outcome::Won),
            BetStatus::Lost => Some(Outcome::Lost),
            BetStatus::Settled => match self.realized_winnings {
                Some(w) if w > Decimal::ZERO => Some(Outcome::Won),
                _ => Some(Outcome::Lost),
            },
        }
    }

    /// Net gain over the stake; `None` unless the bet was won.
    #[must_use]
    pub fn net_gain(&self) -> Option<Amount> {
        match self.outcome() {
            Some(Outcome::Won) => self.realized_winnings.map(|w| w - self.stake),
            _ => None,
        }
    }

    pub(crate) fn mark_won(&mut self, winnings: Amount) {
        self.status = BetStatus::Won;
        self.realized_winnings = Some(winnings);
    }

    pub(crate) fn mark_lost(&mut self) {
        self.status = BetStatus::Lost;
        self.realized_winnings = Some(Decimal::ZERO);
    }

    /// Move a won or lost bet to `Settled`.
    pub fn mark_settled(&mut self) -> Result<(), ValidationError> {
        match self.status {
            BetStatus::Won | BetStatus::Lost => {
                self.status = BetStatus::Settled;
                Ok(())
            }
            BetStatus::Settled => Ok(()),
            BetStatus::Active => Err(ValidationError::InvalidTransition {
                entity: "bet",
                from: self.status.to_string(),
                to: BetStatus::Settled.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bet(stake: Decimal) -> Result<Bet, ValidationError> {
        Bet::try_new(
            BetId::new("b-1"),
            ParticipantId::new("alice"),
            QuestionId::new("q-1"),
            EventId::new("e-1"),
            "Yes",
            stake,
            Utc::now(),
        )
    }

    #[test]
    fn new_bet_is_active_without_winnings() {
        let b = bet(dec!(10)).unwrap();
        assert_eq!(b.status(), BetStatus::Active);
        assert_eq!(b.realized_winnings(), None);
        assert_eq!(b.outcome(), None);
    }

    #[test]
    fn zero_and_negative_stakes_are_rejected() {
        assert!(matches!(
            bet(dec!(0)),
            Err(ValidationError::NonPositiveStake { .. })
        ));
        assert!(matches!(
            bet(dec!(-5)),
            Err(ValidationError::NonPositiveStake { .. })
        ));
    }

    #[test]
    fn won_bet_reports_net_gain() {
        let mut b = bet(dec!(25)).unwrap();
        b.mark_won(dec!(31.82));
        assert_eq!(b.outcome(), Some(Outcome::Won));
        assert_eq!(b.net_gain(), Some(dec!(6.82)));
    }

    #[test]
    fn lost_bet_has_zero_winnings_and_no_gain() {
        let mut b = bet(dec!(15)).unwrap();
        b.mark_lost();
        assert_eq!(b.realized_winnings(), Some(Decimal::ZERO));
        assert_eq!(b.net_gain(), None);
    }

    #[test]
    fn settled_bet_keeps_its_outcome() {
        let mut won = bet(dec!(10)).unwrap();
        won.mark_won(dec!(12));
        won.mark_settled().unwrap();
        assert_eq!(won.status(), BetStatus::Settled);
        assert_eq!(won.outcome(), Some(Outcome::Won));

        let mut lost = bet(dec!(10)).unwrap();
        lost.mark_lost();
        lost.mark_settled().unwrap();
        assert_eq!(lost.outcome(), Some(Outcome::Lost));
    }

    #[test]
    fn active_bet_cannot_be_settled() {
        let mut b = bet(dec!(10)).unwrap();
        assert!(matches!(
            b.mark_settled(),
            Err(ValidationError::InvalidTransition { .. })
        ));
    }
}
