//! Question resolution.
//!
//! Given a closed question and its bets, classifies every bet as won or
//! lost against the declared correct answer and fixes the realized
//! winnings from the final pools. Nothing is persisted here; the caller
//! stores the returned [`Resolution`] atomically.
//!
//! Resolution is idempotent. Resolving an already resolved question with
//! the same answer returns the stored outcome untouched, while a
//! different answer fails with [`EngineError::AlreadyResolvedConflict`].

use tracing::{debug, info};

use crate::application::odds::ensure_bets_belong;
use crate::domain::error::ValidationError;
use crate::domain::money::checked_sum;
use crate::domain::payout::potential_winnings;
use crate::domain::{Amount, Bet, BetStatus, Outcome, Pool, Question, QuestionStatus};
use crate::error::EngineError;

/// Outcome of resolving a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The question, now resolved.
    pub question: Question,
    /// Every bet with its final status and winnings, ordered by bet ID.
    pub bets: Vec<Bet>,
    /// Pools the winnings were computed from.
    pub pool: Pool,
    /// True when the question was already resolved with this answer.
    pub already_resolved: bool,
}

impl Resolution {
    /// The declared correct answer.
    #[must_use]
    pub fn correct_answer(&self) -> &str {
        self.question.correct_answer().unwrap_or_default()
    }

    /// Bets that won.
    pub fn winners(&self) -> impl Iterator<Item = &Bet> {
        self.bets
            .iter()
            .filter(|b| b.outcome() == Some(Outcome::Won))
    }

    /// Bets that lost.
    pub fn losers(&self) -> impl Iterator<Item = &Bet> {
        self.bets
            .iter()
            .filter(|b| b.outcome() == Some(Outcome::Lost))
    }

    /// Sum of realized winnings over all bets.
    pub fn total_winnings(&self) -> Result<Amount, ValidationError> {
        checked_sum(
            self.bets.iter().filter_map(Bet::realized_winnings),
            "total winnings",
        )
    }
}

/// Resolve `question` with `correct_answer`.
///
/// Fails with `NotReady` unless the question is closed (or already
/// resolved), and with a validation error when the answer is not one of
/// the question's labels.
pub fn resolve_question(
    question: &Question,
    bets: &[Bet],
    correct_answer: &str,
) -> Result<Resolution, EngineError> {
    ensure_bets_belong(question, bets)?;

    match question.status() {
        QuestionStatus::Resolved => return replay(question, bets, correct_answer),
        QuestionStatus::Open => {
            return Err(EngineError::NotReady {
                question_id: question.id().clone(),
                status: question.status(),
                expected: QuestionStatus::Closed,
            });
        }
        QuestionStatus::Closed => {}
    }

    question.check_answer(correct_answer)?;

    if let Some(bet) = bets.iter().find(|b| b.status() != BetStatus::Active) {
        return Err(EngineError::InsufficientPoolData {
            question_id: question.id().clone(),
            reason: format!("bet {} is already {}", bet.id(), bet.status()),
        });
    }

    let pool = Pool::from_bets(bets)?;
    let total_pool = pool.total();
    let winning_pool = pool.answer_total(correct_answer);

    let mut resolved = Vec::with_capacity(bets.len());
    for bet in bets {
        let mut bet = bet.clone();
        if bet.chosen_answer() == correct_answer {
            bet.mark_won(potential_winnings(bet.stake(), total_pool, winning_pool)?);
        } else {
            bet.mark_lost();
        }
        resolved.push(bet);
    }
    resolved.sort_by(|a, b| a.id().cmp(b.id()));

    let mut question = question.clone();
    question.mark_resolved(correct_answer);

    let resolution = Resolution {
        question,
        bets: resolved,
        pool,
        already_resolved: false,
    };

    info!(
        question_id = %resolution.question.id(),
        answer = correct_answer,
        winners = resolution.winners().count(),
        losers = resolution.losers().count(),
        total_pool = %total_pool,
        "Question resolved"
    );

    Ok(resolution)
}

/// Handle a resolution request for a question that is already resolved.
fn replay(
    question: &Question,
    bets: &[Bet],
    correct_answer: &str,
) -> Result<Resolution, EngineError> {
    let existing = question.correct_answer().unwrap_or_default();
    if existing != correct_answer {
        return Err(EngineError::AlreadyResolvedConflict {
            question_id: question.id().clone(),
            existing: existing.to_string(),
            requested: correct_answer.to_string(),
        });
    }

    if let Some(bet) = bets.iter().find(|b| !b.is_resolved()) {
        return Err(EngineError::InsufficientPoolData {
            question_id: question.id().clone(),
            reason: format!("bet {} is still active", bet.id()),
        });
    }

    let mut bets = bets.to_vec();
    bets.sort_by(|a, b| a.id().cmp(b.id()));

    debug!(
        question_id = %question.id(),
        answer = correct_answer,
        "Question already resolved with this answer"
    );

    Ok(Resolution {
        question: question.clone(),
        pool: Pool::from_bets(&bets)?,
        bets,
        already_resolved: true,
    })
}
