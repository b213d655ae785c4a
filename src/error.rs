use thiserror::Error;

use crate::domain::error::ValidationError;
use crate::domain::{ObligationKey, QuestionId, QuestionStatus};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised by the settlement engine.
///
/// None of these leave partial state behind: every computation either
/// produces a complete result ready to persist or fails before any
/// persistence call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("question {question_id} is {status}, expected {expected}")]
    NotReady {
        question_id: QuestionId,
        status: QuestionStatus,
        expected: QuestionStatus,
    },

    #[error("question {question_id} already resolved as '{existing}', refusing '{requested}'")]
    AlreadyResolvedConflict {
        question_id: QuestionId,
        existing: String,
        requested: String,
    },

    #[error("insufficient pool data for question {question_id}: {reason}")]
    InsufficientPoolData {
        question_id: QuestionId,
        reason: String,
    },
}

impl EngineError {
    /// True when retrying later may succeed without any change of input.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}

/// Errors from the storage boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("question not found: {0}")]
    QuestionNotFound(QuestionId),

    #[error("obligation not found: {0}")]
    ObligationNotFound(ObligationKey),

    #[error("question {question_id} changed concurrently (expected {expected})")]
    ResolutionConflict {
        question_id: QuestionId,
        expected: QuestionStatus,
    },

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Engine(EngineError::Validation(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_ready_is_retryable() {
        let not_ready = EngineError::NotReady {
            question_id: QuestionId::new("q"),
            status: QuestionStatus::Open,
            expected: QuestionStatus::Closed,
        };
        let conflict = EngineError::AlreadyResolvedConflict {
            question_id: QuestionId::new("q"),
            existing: "Yes".into(),
            requested: "No".into(),
        };
        assert!(not_ready.is_retryable());
        assert!(!conflict.is_retryable());
    }

    #[test]
    fn validation_errors_lift_into_engine_errors() {
        let err: Error = ValidationError::EmptyAnswer.into();
        assert!(matches!(
            err,
            Error::Engine(EngineError::Validation(ValidationError::EmptyAnswer))
        ));
    }

    #[test]
    fn not_ready_message_names_both_states() {
        let err = EngineError::NotReady {
            question_id: QuestionId::new("q-9"),
            status: QuestionStatus::Open,
            expected: QuestionStatus::Closed,
        };
        assert_eq!(err.to_string(), "question q-9 is open, expected closed");
    }
}
