//! Wagering use cases over a [`WagerStore`].
//!
//! Each operation fetches fresh inputs from the store, runs the pure
//! engine functions, and only then issues the persistence call, so a
//! failing computation never leaves a partial write behind.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::application::leaderboard::{compute_leaderboard, LeaderboardQuery};
use crate::application::odds::{compute_live_odds, LiveOdds, ProspectiveBet};
use crate::application::placement::{place_bet, BetLimits, BetRequest};
use crate::application::resolver::{resolve_question, Resolution};
use crate::application::settlement::{
    bets_to_settle, generate_event_settlements, generate_settlements, SettlementPlan,
};
use crate::domain::{
    Bet, EventId, LeaderboardEntry, ObligationKey, ObligationStatus, Question, QuestionId,
    QuestionStatus, SettlementObligation,
};
use crate::error::{EngineError, Result};
use crate::port::WagerStore;

/// Entry point for the wagering use cases.
pub struct WagerService<S> {
    store: Arc<S>,
    limits: BetLimits,
}

impl<S> Clone for WagerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            limits: self.limits,
        }
    }
}

impl<S: WagerStore> WagerService<S> {
    /// Create a service over `store` with the given stake limits.
    pub fn new(store: Arc<S>, limits: BetLimits) -> Self {
        Self { store, limits }
    }

    /// Get the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Live odds for a question, optionally previewing a prospective bet.
    pub async fn live_odds(
        &self,
        question_id: &QuestionId,
        prospective: Option<&ProspectiveBet>,
    ) -> Result<LiveOdds> {
        let question = self.store.fetch_question(question_id).await?;
        let bets = self.store.fetch_bets_for_question(question_id).await?;
        Ok(compute_live_odds(&question, &bets, prospective)?)
    }

    /// Validate and store a new bet.
    pub async fn place_bet(
        &self,
        question_id: &QuestionId,
        request: BetRequest,
        now: DateTime<Utc>,
    ) -> Result<Bet> {
        let question = self.store.fetch_question(question_id).await?;
        let existing = self.store.fetch_bets_for_question(question_id).await?;
        let bet = place_bet(&question, &existing, request, &self.limits, now)?;

        self.store.insert_bet(&bet).await?;

        info!(
            bet_id = %bet.id(),
            participant_id = %bet.participant_id(),
            question_id = %question_id,
            answer = bet.chosen_answer(),
            stake = %bet.stake(),
            "Bet placed"
        );
        Ok(bet)
    }

    /// Close betting on a question now, whatever its deadline.
    pub async fn close_question(&self, question_id: &QuestionId) -> Result<Question> {
        let mut question = self.store.fetch_question(question_id).await?;
        if question.status() == QuestionStatus::Open {
            question.close()?;
            question = self.store.close_question(question_id).await?;
            info!(question_id = %question_id, "Question closed");
        }
        Ok(question)
    }

    /// Close betting on a question if its deadline has passed at `now`.
    pub async fn close_if_due(&self, question_id: &QuestionId, now: DateTime<Utc>) -> Result<Question> {
        let mut question = self.store.fetch_question(question_id).await?;
        if question.close_if_due(now) {
            question = self.store.close_question(question_id).await?;
            info!(question_id = %question_id, "Question closed at deadline");
        }
        Ok(question)
    }

    /// Resolve a question and persist the outcome.
    ///
    /// A question whose deadline has passed is closed first. Re-resolving
    /// with the same answer returns the stored outcome without writing.
    pub async fn resolve(
        &self,
        question_id: &QuestionId,
        correct_answer: &str,
        now: DateTime<Utc>,
    ) -> Result<Resolution> {
        let question = self.close_if_due(question_id, now).await?;
        let bets = self.store.fetch_bets_for_question(question_id).await?;

        let resolution = match resolve_question(&question, &bets, correct_answer) {
            // Resolved concurrently between the two reads: read again.
            Err(EngineError::InsufficientPoolData { .. })
                if question.status() == QuestionStatus::Closed =>
            {
                let question = self.store.fetch_question(question_id).await?;
                let bets = self.store.fetch_bets_for_question(question_id).await?;
                resolve_question(&question, &bets, correct_answer)?
            }
            other => other?,
        };
        if !resolution.already_resolved {
            self.store
                .persist_resolution(question_id, correct_answer, &resolution.bets)
                .await?;
        }
        Ok(resolution)
    }

    /// Generate and upsert settlement obligations for a resolved question.
    pub async fn generate_settlements(&self, question_id: &QuestionId) -> Result<SettlementPlan> {
        let question = self.store.fetch_question(question_id).await?;
        let bets = self.store.fetch_bets_for_question(question_id).await?;

        let plan = generate_settlements(&question, &bets)?;
        self.store.persist_settlements(&plan.obligations).await?;

        info!(
            question_id = %question_id,
            obligations = plan.obligations.len(),
            total = %plan.total,
            "Settlements generated"
        );
        Ok(plan)
    }

    /// Generate and upsert obligations for every resolved question of an event.
    pub async fn generate_event_settlements(&self, event_id: &EventId) -> Result<Vec<SettlementPlan>> {
        let questions = self.store.fetch_questions_for_event(event_id).await?;

        let mut bets = Vec::new();
        for question in questions
            .iter()
            .filter(|q| q.status() == QuestionStatus::Resolved)
        {
            bets.extend(self.store.fetch_bets_for_question(question.id()).await?);
        }

        let plans = generate_event_settlements(&questions, &bets)?;
        let obligations: Vec<SettlementObligation> = plans
            .iter()
            .flat_map(|p| p.obligations.iter().cloned())
            .collect();
        self.store.persist_settlements(&obligations).await?;

        info!(
            event_id = %event_id,
            questions = plans.len(),
            obligations = obligations.len(),
            "Event settlements generated"
        );
        Ok(plans)
    }

    /// Complete or dispute a pending obligation.
    ///
    /// The transition is checked against the stored status by the store,
    /// so of two racing callers only the first to leave `pending` wins.
    /// On completion, bets whose obligations are now all completed are
    /// moved to `settled`.
    pub async fn update_obligation_status(
        &self,
        key: &ObligationKey,
        status: ObligationStatus,
    ) -> Result<SettlementObligation> {
        let obligation = self.store.transition_obligation(key, status).await?;

        info!(obligation = %key, status = %status, "Obligation updated");

        if status == ObligationStatus::Completed {
            let obligations = self
                .store
                .fetch_obligations_for_question(&key.question_id)
                .await?;
            let bets = self.store.fetch_bets_for_question(&key.question_id).await?;
            let settled = bets_to_settle(&bets, &obligations);
            if !settled.is_empty() {
                self.store.mark_bets_settled(&settled).await?;
                info!(question_id = %key.question_id, bets = settled.len(), "Bets settled");
            }
        }
        Ok(obligation)
    }

    /// Compute the leaderboard for `query` at `now`.
    pub async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let participants = self.store.fetch_participants().await?;
        let bets = self
            .store
            .fetch_resolved_bets_in_window(query.period.window_start(now))
            .await?;
        Ok(compute_leaderboard(&participants, &bets, query, now)?)
    }
}
