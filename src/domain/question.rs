//! Questions participants wager on.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::id::{EventId, QuestionId};

/// Labels used for binary questions when none are supplied.
pub const BINARY_ANSWERS: [&str; 2] = ["Yes", "No"];

/// Kind of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Two fixed labels, Yes/No by default.
    #[serde(alias = "yes_no")]
    Binary,
    /// A fixed list of at least two labels.
    MultipleChoice,
    /// Any number written as text, matched exactly.
    Numeric,
    /// Any text, matched exactly.
    FreeText,
}

impl QuestionKind {
    /// True when answers must come from a fixed label list.
    #[must_use]
    pub const fn has_fixed_answers(self) -> bool {
        matches!(self, Self::Binary | Self::MultipleChoice)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Binary => "binary",
            Self::MultipleChoice => "multiple_choice",
            Self::Numeric => "numeric",
            Self::FreeText => "free_text",
        };
        f.write_str(label)
    }
}

/// Lifecycle status of a question: `open -> closed -> resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Open,
    Closed,
    Resolved,
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Resolved => "resolved",
        };
        f.write_str(label)
    }
}

/// A question within an event.
///
/// The correct answer is present if and only if the status is
/// [`QuestionStatus::Resolved`]; once set it never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    event_id: EventId,
    title: String,
    kind: QuestionKind,
    #[serde(default)]
    options: Vec<String>,
    status: QuestionStatus,
    #[serde(default)]
    correct_answer: Option<String>,
    betting_closes_at: DateTime<Utc>,
}

impl Question {
    /// Create a new open question, validating its answer labels.
    ///
    /// Binary questions with no labels get [`BINARY_ANSWERS`]. Labels
    /// supplied for numeric or free-text questions are discarded.
    pub fn try_new(
        id: QuestionId,
        event_id: EventId,
        title: impl Into<String>,
        kind: QuestionKind,
        options: Vec<String>,
        betting_closes_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let options = match kind {
            QuestionKind::Binary if options.is_empty() => {
                BINARY_ANSWERS.iter().map(|s| (*s).to_string()).collect()
            }
            QuestionKind::Binary | QuestionKind::MultipleChoice => options,
            QuestionKind::Numeric | QuestionKind::FreeText => Vec::new(),
        };

        let question = Self {
            id,
            event_id,
            title: title.into(),
            kind,
            options,
            status: QuestionStatus::Open,
            correct_answer: None,
            betting_closes_at,
        };
        question.validate()?;
        Ok(question)
    }

    /// Check the structural invariants of a question.
    ///
    /// Used by `try_new` and after loading questions from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.kind {
            QuestionKind::Binary if self.options.len() != 2 => {
                return Err(ValidationError::MissingAnswerOptions {
                    question_id: self.id.clone(),
                    count: self.options.len(),
                });
            }
            QuestionKind::MultipleChoice if self.options.len() < 2 => {
                return Err(ValidationError::MissingAnswerOptions {
                    question_id: self.id.clone(),
                    count: self.options.len(),
                });
            }
            _ => {}
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if option.trim().is_empty() {
                return Err(ValidationError::EmptyAnswer);
            }
            if !seen.insert(option.as_str()) {
                return Err(ValidationError::DuplicateAnswerOption {
                    answer: option.clone(),
                });
            }
        }

        match (self.status, &self.correct_answer) {
            (QuestionStatus::Resolved, Some(answer)) => self.check_answer(answer),
            (QuestionStatus::Resolved, None) => Err(ValidationError::InvalidTransition {
                entity: "question",
                from: self.status.to_string(),
                to: "resolved without an answer".into(),
            }),
            (_, Some(_)) => Err(ValidationError::InvalidTransition {
                entity: "question",
                from: self.status.to_string(),
                to: "answered without resolving".into(),
            }),
            (_, None) => Ok(()),
        }
    }

    /// Get the question ID.
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Get the owning event ID.
    #[must_use]
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Get the question title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the answer kind.
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    /// Ordered answer labels; empty for numeric and free-text questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> QuestionStatus {
        self.status
    }

    /// Get the correct answer, set only once resolved.
    #[must_use]
    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }

    /// Get the betting deadline.
    #[must_use]
    pub fn betting_closes_at(&self) -> DateTime<Utc> {
        self.betting_closes_at
    }

    /// Returns true if the question still accepts bets at `now`.
    #[must_use]
    pub fn accepts_bets_at(&self, now: DateTime<Utc>) -> bool {
        self.status == QuestionStatus::Open && now < self.betting_closes_at
    }

    /// Check that `answer` is acceptable for this question.
    ///
    /// Choice questions require an exact, case-sensitive label match.
    /// Numeric questions require a decimal number; answers are still
    /// matched as exact strings, so "3" and "3.0" differ. Free-text
    /// questions accept any non-empty string.
    pub fn check_answer(&self, answer: &str) -> Result<(), ValidationError> {
        if answer.trim().is_empty() {
            return Err(ValidationError::EmptyAnswer);
        }
        match self.kind {
            QuestionKind::Binary | QuestionKind::MultipleChoice
                if !self.options.iter().any(|o| o == answer) =>
            {
                Err(ValidationError::UnknownAnswer {
                    question_id: self.id.clone(),
                    answer: answer.to_string(),
                })
            }
            QuestionKind::Numeric if Decimal::from_str(answer).is_err() => {
                Err(ValidationError::NonNumericAnswer {
                    question_id: self.id.clone(),
                    answer: answer.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Close betting if the deadline has passed. Returns true on transition.
    pub fn close_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == QuestionStatus::Open && now >= self.betting_closes_at {
            self.status = QuestionStatus::Closed;
            return true;
        }
        false
    }

    /// Close betting immediately, regardless of the deadline.
    ///
    /// Closing an already closed question is a no-op.
    pub fn close(&mut self) -> Result<(), ValidationError> {
        match self.status {
            QuestionStatus::Open => {
                self.status = QuestionStatus::Closed;
                Ok(())
            }
            QuestionStatus::Closed => Ok(()),
            QuestionStatus::Resolved => Err(ValidationError::InvalidTransition {
                entity: "question",
                from: self.status.to_string(),
                to: QuestionStatus::Closed.to_string(),
            }),
        }
    }

    /// Record the correct answer. Callers check status and answer first.
    pub(crate) fn mark_resolved(&mut self, answer: &str) {
        self.status = QuestionStatus::Resolved;
        self.correct_answer = Some(answer.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn question(kind: QuestionKind, options: &[&str]) -> Result<Question, ValidationError> {
        Question::try_new(
            QuestionId::new("q-1"),
            EventId::new("e-1"),
            "Who wins?",
            kind,
            options.iter().map(|s| (*s).to_string()).collect(),
            Utc::now() + Duration::hours(1),
        )
    }

    #[test]
    fn binary_defaults_to_yes_no() {
        let q = question(QuestionKind::Binary, &[]).unwrap();
        assert_eq!(q.options(), ["Yes", "No"]);
        assert_eq!(q.status(), QuestionStatus::Open);
    }

    #[test]
    fn multiple_choice_requires_two_options() {
        let result = question(QuestionKind::MultipleChoice, &["Red"]);
        assert!(matches!(
            result,
            Err(ValidationError::MissingAnswerOptions { count: 1, .. })
        ));
    }

    #[test]
    fn duplicate_options_are_rejected() {
        let result = question(QuestionKind::MultipleChoice, &["Red", "Red"]);
        assert!(matches!(
            result,
            Err(ValidationError::DuplicateAnswerOption { .. })
        ));
    }

    #[test]
    fn free_text_discards_options() {
        let q = question(QuestionKind::FreeText, &["ignored"]).unwrap();
        assert!(q.options().is_empty());
    }

    #[test]
    fn check_answer_is_case_sensitive_for_choices() {
        let q = question(QuestionKind::Binary, &[]).unwrap();
        assert!(q.check_answer("Yes").is_ok());
        assert!(matches!(
            q.check_answer("yes"),
            Err(ValidationError::UnknownAnswer { .. })
        ));
    }

    #[test]
    fn check_answer_requires_a_number_for_numeric() {
        let q = question(QuestionKind::Numeric, &[]).unwrap();
        assert!(q.check_answer("42").is_ok());
        assert!(q.check_answer("-3.25").is_ok());
        assert!(matches!(q.check_answer("  "), Err(ValidationError::EmptyAnswer)));
        assert!(matches!(
            q.check_answer("banana"),
            Err(ValidationError::NonNumericAnswer { .. })
        ));
    }

    #[test]
    fn check_answer_accepts_any_text_for_free_text() {
        let q = question(QuestionKind::FreeText, &[]).unwrap();
        assert!(q.check_answer("banana").is_ok());
    }

    #[test]
    fn close_if_due_only_after_deadline() {
        let mut q = question(QuestionKind::Binary, &[]).unwrap();
        let deadline = q.betting_closes_at();

        assert!(!q.close_if_due(deadline - Duration::seconds(1)));
        assert_eq!(q.status(), QuestionStatus::Open);

        assert!(q.close_if_due(deadline));
        assert_eq!(q.status(), QuestionStatus::Closed);
        assert!(!q.close_if_due(deadline));
    }

    #[test]
    fn resolved_question_cannot_be_closed() {
        let mut q = question(QuestionKind::Binary, &[]).unwrap();
        q.close().unwrap();
        q.mark_resolved("Yes");
        assert!(matches!(
            q.close(),
            Err(ValidationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn validate_rejects_answer_without_resolution() {
        let mut q = question(QuestionKind::Binary, &[]).unwrap();
        q.correct_answer = Some("Yes".into());
        assert!(q.validate().is_err());
    }

    #[test]
    fn kind_accepts_legacy_yes_no_label() {
        let kind: QuestionKind = serde_json::from_str("\"yes_no\"").unwrap();
        assert_eq!(kind, QuestionKind::Binary);
    }
}
