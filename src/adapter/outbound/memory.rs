//! In-memory store implementation.
//!
//! All tables sit behind one lock so that each port method is a single
//! atomic step, which is what the engine relies on for duplicate-bet
//! rejection and compare-and-set resolution.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::snapshot::Snapshot;
use crate::domain::error::ValidationError;
use crate::domain::{
    Bet, BetId, EventId, ObligationKey, ObligationStatus, Participant, ParticipantId, Question,
    QuestionId, QuestionStatus, SettlementObligation,
};
use crate::error::{EngineError, Result, StoreError};
use crate::port::WagerStore;

#[derive(Debug, Default)]
struct Tables {
    participants: BTreeMap<ParticipantId, Participant>,
    questions: HashMap<QuestionId, Question>,
    bets: BTreeMap<BetId, Bet>,
    obligations: BTreeMap<ObligationKey, SettlementObligation>,
}

impl Tables {
    fn question(&self, id: &QuestionId) -> Result<&Question> {
        self.questions
            .get(id)
            .ok_or_else(|| StoreError::QuestionNotFound(id.clone()).into())
    }

    fn bets_for<'a>(&'a self, id: &'a QuestionId) -> impl Iterator<Item = &'a Bet> + 'a {
        self.bets.values().filter(move |b| b.question_id() == id)
    }
}

/// In-memory [`WagerStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding everything in `snapshot`.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let tables = Tables {
            participants: snapshot
                .participants
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            questions: snapshot
                .questions
                .into_iter()
                .map(|q| (q.id().clone(), q))
                .collect(),
            bets: snapshot
                .bets
                .into_iter()
                .map(|b| (b.id().clone(), b))
                .collect(),
            obligations: snapshot
                .obligations
                .into_iter()
                .map(|o| (o.key(), o))
                .collect(),
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy the current contents out as a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let tables = self.tables.read();
        let mut questions: Vec<Question> = tables.questions.values().cloned().collect();
        questions.sort_by(|a, b| a.id().cmp(b.id()));
        Snapshot {
            participants: tables.participants.values().cloned().collect(),
            questions,
            bets: tables.bets.values().cloned().collect(),
            obligations: tables.obligations.values().cloned().collect(),
        }
    }

    /// Register or rename a participant.
    pub fn add_participant(&self, participant: Participant) {
        self.tables
            .write()
            .participants
            .insert(participant.id.clone(), participant);
    }

    /// Register a participant named after its ID unless already known.
    pub fn ensure_participant(&self, id: &ParticipantId) {
        self.tables
            .write()
            .participants
            .entry(id.clone())
            .or_insert_with(|| Participant::new(id.clone(), id.as_str()));
    }

    /// Insert or replace a question.
    pub fn add_question(&self, question: Question) {
        self.tables
            .write()
            .questions
            .insert(question.id().clone(), question);
    }
}

impl WagerStore for MemoryStore {
    async fn fetch_question(&self, id: &QuestionId) -> Result<Question> {
        self.tables.read().question(id).cloned()
    }

    async fn fetch_questions_for_event(&self, event_id: &EventId) -> Result<Vec<Question>> {
        let tables = self.tables.read();
        let mut questions: Vec<Question> = tables
            .questions
            .values()
            .filter(|q| q.event_id() == event_id)
            .cloned()
            .collect();
        questions.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(questions)
    }

    async fn fetch_bets_for_question(&self, id: &QuestionId) -> Result<Vec<Bet>> {
        let tables = self.tables.read();
        tables.question(id)?;
        Ok(tables.bets_for(id).cloned().collect())
    }

    async fn insert_bet(&self, bet: &Bet) -> Result<()> {
        let mut tables = self.tables.write();

        let question = tables.question(bet.question_id())?;
        if question.status() != QuestionStatus::Open {
            return Err(ValidationError::BettingClosed {
                question_id: bet.question_id().clone(),
            }
            .into());
        }
        if tables
            .bets_for(bet.question_id())
            .any(|b| b.participant_id() == bet.participant_id())
        {
            return Err(ValidationError::DuplicateBet {
                participant_id: bet.participant_id().clone(),
                question_id: bet.question_id().clone(),
            }
            .into());
        }

        tables.bets.insert(bet.id().clone(), bet.clone());
        Ok(())
    }

    async fn close_question(&self, id: &QuestionId) -> Result<Question> {
        let mut tables = self.tables.write();
        let question = tables
            .questions
            .get_mut(id)
            .ok_or_else(|| StoreError::QuestionNotFound(id.clone()))?;
        question.close()?;
        Ok(question.clone())
    }

    async fn persist_resolution(
        &self,
        question_id: &QuestionId,
        correct_answer: &str,
        resolved_bets: &[Bet],
    ) -> Result<()> {
        let mut tables = self.tables.write();

        let question = tables.question(question_id)?;
        match question.status() {
            QuestionStatus::Resolved => {
                let existing = question.correct_answer().unwrap_or_default();
                if existing == correct_answer {
                    return Ok(());
                }
                return Err(EngineError::AlreadyResolvedConflict {
                    question_id: question_id.clone(),
                    existing: existing.to_string(),
                    requested: correct_answer.to_string(),
                }
                .into());
            }
            QuestionStatus::Open => {
                return Err(StoreError::ResolutionConflict {
                    question_id: question_id.clone(),
                    expected: QuestionStatus::Closed,
                }
                .into());
            }
            QuestionStatus::Closed => {}
        }

        // The resolved set must be exactly the stored one.
        let stored = tables.bets_for(question_id).count();
        let matches = resolved_bets.len() == stored
            && resolved_bets.iter().all(|b| {
                b.question_id() == question_id && tables.bets.contains_key(b.id())
            });
        if !matches {
            return Err(StoreError::ResolutionConflict {
                question_id: question_id.clone(),
                expected: QuestionStatus::Closed,
            }
            .into());
        }

        if let Some(question) = tables.questions.get_mut(question_id) {
            question.mark_resolved(correct_answer);
        }
        for bet in resolved_bets {
            tables.bets.insert(bet.id().clone(), bet.clone());
        }
        Ok(())
    }

    async fn persist_settlements(&self, obligations: &[SettlementObligation]) -> Result<()> {
        let mut tables = self.tables.write();
        for obligation in obligations {
            let key = obligation.key();
            let keep = tables
                .obligations
                .get(&key)
                .is_some_and(|existing| existing.status() != ObligationStatus::Pending);
            if !keep {
                tables.obligations.insert(key, obligation.clone());
            }
        }
        Ok(())
    }

    async fn fetch_obligation(&self, key: &ObligationKey) -> Result<SettlementObligation> {
        self.tables
            .read()
            .obligations
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::ObligationNotFound(key.clone()).into())
    }

    async fn fetch_obligations_for_question(
        &self,
        id: &QuestionId,
    ) -> Result<Vec<SettlementObligation>> {
        Ok(self
            .tables
            .read()
            .obligations
            .values()
            .filter(|o| o.question_id() == id)
            .cloned()
            .collect())
    }

    async fn transition_obligation(
        &self,
        key: &ObligationKey,
        status: ObligationStatus,
    ) -> Result<SettlementObligation> {
        let mut tables = self.tables.write();
        let slot = tables
            .obligations
            .get_mut(key)
            .ok_or_else(|| StoreError::ObligationNotFound(key.clone()))?;
        slot.transition(status)?;
        Ok(slot.clone())
    }

    async fn mark_bets_settled(&self, ids: &[BetId]) -> Result<()> {
        let mut tables = self.tables.write();

        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(bet) = tables.bets.get(id) else {
                continue;
            };
            let mut bet = bet.clone();
            bet.mark_settled()?;
            updated.push(bet);
        }
        for bet in updated {
            tables.bets.insert(bet.id().clone(), bet);
        }
        Ok(())
    }

    async fn fetch_participants(&self) -> Result<Vec<Participant>> {
        Ok(self.tables.read().participants.values().cloned().collect())
    }

    async fn fetch_resolved_bets_in_window(
        &self,
        window_start: Option<DateTime<Utc>>,
    ) -> Result<Vec<Bet>> {
        Ok(self
            .tables
            .read()
            .bets
            .values()
            .filter(|b| b.is_resolved())
            .filter(|b| window_start.map_or(true, |start| b.created_at() >= start))
            .cloned()
            .collect())
    }
}
