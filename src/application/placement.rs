//! Bet placement validation.
//!
//! Checks a new bet against its question, the configured stake limits
//! and the bets already on the question. The store enforces the
//! one-bet-per-participant rule again atomically when inserting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::error::ValidationError;
use crate::domain::{Amount, Bet, BetId, ParticipantId, Question};
use crate::error::EngineError;

/// Stake limits applied at placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetLimits {
    pub min_stake: Amount,
    pub max_stake: Option<Amount>,
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            min_stake: dec!(0.01),
            max_stake: None,
        }
    }
}

impl BetLimits {
    /// Check `stake` against the limits.
    pub fn check(&self, stake: Amount) -> Result<(), ValidationError> {
        if stake <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveStake { stake });
        }
        if stake < self.min_stake {
            return Err(ValidationError::StakeBelowMinimum {
                stake,
                min: self.min_stake,
            });
        }
        if let Some(max) = self.max_stake {
            if stake > max {
                return Err(ValidationError::StakeAboveMaximum { stake, max });
            }
        }
        Ok(())
    }
}

/// A participant's request to bet on a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetRequest {
    pub participant_id: ParticipantId,
    pub answer: String,
    pub stake: Amount,
}

/// Validate `request` and build the new active bet.
///
/// `existing` are the bets already on the question.
pub fn place_bet(
    question: &Question,
    existing: &[Bet],
    request: BetRequest,
    limits: &BetLimits,
    now: DateTime<Utc>,
) -> Result<Bet, EngineError> {
    if !question.accepts_bets_at(now) {
        return Err(ValidationError::BettingClosed {
            question_id: question.id().clone(),
        }
        .into());
    }
    question.check_answer(&request.answer)?;
    limits.check(request.stake)?;

    if existing
        .iter()
        .any(|b| b.question_id() == question.id() && b.participant_id() == &request.participant_id)
    {
        return Err(ValidationError::DuplicateBet {
            participant_id: request.participant_id,
            question_id: question.id().clone(),
        }
        .into());
    }

    let bet = Bet::try_new(
        BetId::generate(),
        request.participant_id,
        question.id().clone(),
        question.event_id().clone(),
        request.answer,
        request.stake,
        now,
    )?;
    Ok(bet)
}
