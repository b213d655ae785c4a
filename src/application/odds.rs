//! Live odds for an open question.
//!
//! Builds the per-answer pool view shown while betting is open, and an
//! optional preview of what a bet that has not been placed yet would pay.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::error::ValidationError;
use crate::domain::money::checked_add;
use crate::domain::payout::{payout_multiplier, potential_winnings, prospective_winnings};
use crate::domain::{Amount, Bet, Pool, Question, QuestionId};
use crate::error::EngineError;

/// Pool standing of one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOdds {
    pub answer: String,
    pub pool: Amount,
    /// Share of the total pool, as a percentage.
    pub share: Decimal,
    /// Payout per unit staked; `None` while nobody has chosen the answer.
    pub multiplier: Option<Decimal>,
}

/// A bet being considered but not yet placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProspectiveBet {
    pub answer: String,
    pub stake: Amount,
}

/// What a prospective bet would pay if the pools stayed as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetPreview {
    pub answer: String,
    pub stake: Amount,
    pub total_pool_after: Amount,
    pub answer_pool_after: Amount,
    pub potential_winnings: Amount,
}

/// Odds view of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveOdds {
    pub question_id: QuestionId,
    pub total_pool: Amount,
    pub answers: Vec<AnswerOdds>,
    pub preview: Option<BetPreview>,
}

/// Compute live odds for `question` from its current `bets`.
///
/// Choice questions list every label in question order, staked or not.
/// Open-answer questions list the answers that have been staked on.
pub fn compute_live_odds(
    question: &Question,
    bets: &[Bet],
    prospective: Option<&ProspectiveBet>,
) -> Result<LiveOdds, EngineError> {
    ensure_bets_belong(question, bets)?;

    let pool = Pool::from_bets(bets)?;
    let labels: Vec<String> = if question.kind().has_fixed_answers() {
        question.options().to_vec()
    } else {
        pool.answers().map(|(a, _)| a.to_string()).collect()
    };

    let answers = labels
        .into_iter()
        .map(|answer| -> Result<AnswerOdds, ValidationError> {
            let answer_pool = pool.answer_total(&answer);
            Ok(AnswerOdds {
                share: pool.share(&answer),
                multiplier: payout_multiplier(pool.total(), answer_pool)?,
                pool: answer_pool,
                answer,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let preview = prospective
        .map(|bet| preview_bet(question, &pool, bet))
        .transpose()?;

    Ok(LiveOdds {
        question_id: question.id().clone(),
        total_pool: pool.total(),
        answers,
        preview,
    })
}

/// Potential winnings of an already placed bet against the current pool.
pub fn current_potential(bet: &Bet, pool: &Pool) -> Result<Amount, ValidationError> {
    potential_winnings(
        bet.stake(),
        pool.total(),
        pool.answer_total(bet.chosen_answer()),
    )
}

fn preview_bet(
    question: &Question,
    pool: &Pool,
    bet: &ProspectiveBet,
) -> Result<BetPreview, EngineError> {
    question.check_answer(&bet.answer)?;
    if bet.stake <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveStake { stake: bet.stake }.into());
    }

    let total = pool.total();
    let answer_pool = pool.answer_total(&bet.answer);
    Ok(BetPreview {
        answer: bet.answer.clone(),
        stake: bet.stake,
        total_pool_after: checked_add(total, bet.stake, "pool total")?,
        answer_pool_after: checked_add(answer_pool, bet.stake, "answer pool")?,
        potential_winnings: prospective_winnings(bet.stake, total, answer_pool)?,
    })
}

pub(crate) fn ensure_bets_belong(question: &Question, bets: &[Bet]) -> Result<(), EngineError> {
    if let Some(stray) = bets.iter().find(|b| b.question_id() != question.id()) {
        return Err(ValidationError::BetQuestionMismatch {
            expected: question.id().clone(),
            actual: stray.question_id().clone(),
        }
        .into());
    }
    Ok(())
}
