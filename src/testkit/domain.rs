//! Builders for domain primitives used across tests.
//!
//! Every builder places its question or bet in event `e-1`. Bet IDs are
//! `b-{participant}-{question}` so tests can predict them.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    Amount, Bet, BetId, EventId, ParticipantId, Question, QuestionId, QuestionKind,
};

/// Event every builder uses.
pub const EVENT: &str = "e-1";

/// Create an open question of `kind` with no fixed labels, closing in an hour.
pub fn open_question(id: &str, kind: QuestionKind) -> Question {
    Question::try_new(
        QuestionId::new(id),
        EventId::new(EVENT),
        format!("Question {id}"),
        kind,
        Vec::new(),
        Utc::now() + Duration::hours(1),
    )
    .expect("valid question")
}

/// Create an open Yes/No question closing in an hour.
pub fn binary_question(id: &str) -> Question {
    open_question(id, QuestionKind::Binary)
}

/// Create an open multiple-choice question with the given labels.
pub fn multiple_choice(id: &str, options: &[&str]) -> Question {
    Question::try_new(
        QuestionId::new(id),
        EventId::new(EVENT),
        format!("Question {id}"),
        QuestionKind::MultipleChoice,
        options.iter().map(|o| (*o).to_string()).collect(),
        Utc::now() + Duration::hours(1),
    )
    .expect("valid question")
}

/// Close betting on `question`.
pub fn closed(mut question: Question) -> Question {
    question.close().expect("open question closes");
    question
}

/// Create an active bet placed now.
pub fn bet(participant: &str, question: &str, answer: &str, stake: Amount) -> Bet {
    bet_at(participant, question, answer, stake, Utc::now())
}

/// Create an active bet placed at `created_at`.
pub fn bet_at(
    participant: &str,
    question: &str,
    answer: &str,
    stake: Amount,
    created_at: DateTime<Utc>,
) -> Bet {
    Bet::try_new(
        BetId::new(format!("b-{participant}-{question}")),
        ParticipantId::new(participant),
        QuestionId::new(question),
        EventId::new(EVENT),
        answer,
        stake,
        created_at,
    )
    .expect("valid bet")
}

/// Create a bet already resolved as won with `winnings`.
pub fn won_bet(
    participant: &str,
    question: &str,
    stake: Amount,
    winnings: Amount,
    created_at: DateTime<Utc>,
) -> Bet {
    let mut bet = bet_at(participant, question, "Yes", stake, created_at);
    bet.mark_won(winnings);
    bet
}

/// Create a bet already resolved as lost.
pub fn lost_bet(participant: &str, question: &str, stake: Amount, created_at: DateTime<Utc>) -> Bet {
    let mut bet = bet_at(participant, question, "No", stake, created_at);
    bet.mark_lost();
    bet
}
