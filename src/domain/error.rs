//! Validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and by operations
//! that reject a single bet, answer or obligation. They are always
//! recoverable locally: the offending operation is refused and nothing
//! else changes.
//!
//! # Examples
//!
//! ```
//! use betsettle::domain::error::ValidationError;
//! use betsettle::domain::{Bet, BetId, EventId, ParticipantId, QuestionId};
//! use chrono::Utc;
//! use rust_decimal_macros::dec;
//!
//! let result = Bet::try_new(
//!     BetId::new("b-1"),
//!     ParticipantId::new("alice"),
//!     QuestionId::new("q-1"),
//!     EventId::new("e-1"),
//!     "Yes",
//!     dec!(0),
//!     Utc::now(),
//! );
//!
//! assert!(matches!(result, Err(ValidationError::NonPositiveStake { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use super::id::{ParticipantId, QuestionId};

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Stakes must be strictly positive.
    #[error("stake must be positive, got {stake}")]
    NonPositiveStake {
        /// The invalid stake that was provided.
        stake: Decimal,
    },

    /// Stake is below the configured minimum.
    #[error("stake {stake} is below the minimum of {min}")]
    StakeBelowMinimum { stake: Decimal, min: Decimal },

    /// Stake is above the configured maximum.
    #[error("stake {stake} is above the maximum of {max}")]
    StakeAboveMaximum { stake: Decimal, max: Decimal },

    /// Answer is not one of the question's labels.
    #[error("answer '{answer}' is not valid for question {question_id}")]
    UnknownAnswer {
        question_id: QuestionId,
        answer: String,
    },

    /// Numeric questions only take decimal numbers as answers.
    #[error("answer '{answer}' to numeric question {question_id} is not a number")]
    NonNumericAnswer {
        question_id: QuestionId,
        answer: String,
    },

    /// Answers must contain at least one non-whitespace character.
    #[error("answer cannot be empty")]
    EmptyAnswer,

    /// Choice questions need at least two labels.
    #[error("question {question_id} needs at least two answer options, got {count}")]
    MissingAnswerOptions {
        question_id: QuestionId,
        count: usize,
    },

    /// Answer labels must be unique within a question.
    #[error("answer option '{answer}' appears more than once")]
    DuplicateAnswerOption { answer: String },

    /// A participant may hold only one bet per question.
    #[error("{participant_id} already has a bet on question {question_id}")]
    DuplicateBet {
        participant_id: ParticipantId,
        question_id: QuestionId,
    },

    /// Bets are only accepted while the question is open.
    #[error("betting on question {question_id} is closed")]
    BettingClosed { question_id: QuestionId },

    /// A bet was supplied alongside a question it does not belong to.
    #[error("bet belongs to question {actual}, expected {expected}")]
    BetQuestionMismatch {
        expected: QuestionId,
        actual: QuestionId,
    },

    /// Monetary amounts such as obligations must be positive.
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Decimal },

    /// A participant cannot owe money to themselves.
    #[error("{participant_id} cannot owe themselves")]
    SelfObligation { participant_id: ParticipantId },

    /// An amount left the representable decimal range.
    #[error("amount overflow while computing {operation}")]
    AmountOverflow { operation: &'static str },

    /// A status change was requested that the lifecycle does not allow.
    #[error("cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
}
