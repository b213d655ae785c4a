//! Persistence port for questions, bets and settlement obligations.
//!
//! The external store owns identity, schema and transactions. The engine
//! relies on it for three atomic guarantees:
//!
//! - `insert_bet` rejects a second bet for the same (participant,
//!   question) pair with `DuplicateBet`.
//! - `persist_resolution` is a compare-and-set on question status and
//!   correct answer, writing the question and all bet statuses together.
//! - `persist_settlements` upserts keyed by (payer, payee, question).

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{
    Bet, BetId, EventId, ObligationKey, ObligationStatus, Participant, Question, QuestionId,
    SettlementObligation,
};
use crate::error::Result;

/// Storage operations consumed by the settlement engine.
///
/// Implementations must be thread-safe (`Send + Sync`). Every method is
/// a single atomic operation from the engine's point of view.
pub trait WagerStore: Send + Sync {
    /// Fetch a question by ID.
    fn fetch_question(&self, id: &QuestionId) -> impl Future<Output = Result<Question>> + Send;

    /// Fetch every question of an event.
    fn fetch_questions_for_event(
        &self,
        event_id: &EventId,
    ) -> impl Future<Output = Result<Vec<Question>>> + Send;

    /// Fetch all bets on a question.
    fn fetch_bets_for_question(
        &self,
        id: &QuestionId,
    ) -> impl Future<Output = Result<Vec<Bet>>> + Send;

    /// Insert a new bet, failing with `DuplicateBet` if the participant
    /// already has one on the question.
    fn insert_bet(&self, bet: &Bet) -> impl Future<Output = Result<()>> + Send;

    /// Persist an open -> closed transition.
    fn close_question(&self, id: &QuestionId) -> impl Future<Output = Result<Question>> + Send;

    /// Atomically mark the question resolved and write all bet outcomes.
    ///
    /// Succeeds without change if already resolved with the same answer,
    /// fails with `AlreadyResolvedConflict` for a different one.
    fn persist_resolution(
        &self,
        question_id: &QuestionId,
        correct_answer: &str,
        resolved_bets: &[Bet],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Upsert obligations keyed by (payer, payee, question).
    ///
    /// Obligations that already left `pending` keep their status.
    fn persist_settlements(
        &self,
        obligations: &[SettlementObligation],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Fetch one obligation by key.
    fn fetch_obligation(
        &self,
        key: &ObligationKey,
    ) -> impl Future<Output = Result<SettlementObligation>> + Send;

    /// Fetch all obligations created for a question.
    fn fetch_obligations_for_question(
        &self,
        id: &QuestionId,
    ) -> impl Future<Output = Result<Vec<SettlementObligation>>> + Send;

    /// Move a stored obligation to `status` and return it.
    ///
    /// The lifecycle check runs against the stored record in the same
    /// atomic step as the write, so when two transitions race only the
    /// first leaves `pending`; the other fails with `InvalidTransition`.
    /// Repeating the transition that already happened is a no-op.
    fn transition_obligation(
        &self,
        key: &ObligationKey,
        status: ObligationStatus,
    ) -> impl Future<Output = Result<SettlementObligation>> + Send;

    /// Move the given won/lost bets to `settled`.
    fn mark_bets_settled(&self, ids: &[BetId]) -> impl Future<Output = Result<()>> + Send;

    /// Fetch all known participants.
    fn fetch_participants(&self) -> impl Future<Output = Result<Vec<Participant>>> + Send;

    /// Fetch resolved bets created at or after `window_start`
    /// (all resolved bets when `None`).
    fn fetch_resolved_bets_in_window(
        &self,
        window_start: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<Vec<Bet>>> + Send;
}
