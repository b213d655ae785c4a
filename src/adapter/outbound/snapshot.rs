//! JSON snapshot of a [`MemoryStore`](super::memory::MemoryStore).
//!
//! The CLI keeps its state in one JSON file: it loads the snapshot into a
//! memory store, runs a command, and writes the snapshot back.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Bet, Participant, Question, SettlementObligation};
use crate::error::{Result, StoreError};

/// Everything the store holds, in serializable form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub bets: Vec<Bet>,
    #[serde(default)]
    pub obligations: Vec<SettlementObligation>,
}

impl Snapshot {
    /// Read a snapshot from `path`.
    ///
    /// A missing file yields an empty snapshot. Every record is
    /// re-validated, so a hand-edited file cannot smuggle in an invalid
    /// question or bet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse_json(&content)
    }

    /// Parse and validate a snapshot from a JSON string.
    pub fn parse_json(content: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<()> {
        for question in &self.questions {
            question.validate().map_err(|e| {
                StoreError::Snapshot(format!("question {}: {e}", question.id()))
            })?;
        }
        for bet in &self.bets {
            bet.validate()
                .map_err(|e| StoreError::Snapshot(format!("bet {}: {e}", bet.id())))?;
            if !self.questions.iter().any(|q| q.id() == bet.question_id()) {
                return Err(StoreError::Snapshot(format!(
                    "bet {} refers to unknown question {}",
                    bet.id(),
                    bet.question_id()
                ))
                .into());
            }
        }
        for obligation in &self.obligations {
            obligation
                .validate()
                .map_err(|e| StoreError::Snapshot(format!("obligation {}: {e}", obligation.key())))?;
        }
        Ok(())
    }

    /// Write the snapshot to `path` atomically.
    ///
    /// Writes to a temp file next to the target, then renames it over.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, path).map_err(cleanup_and_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testkit::domain::{bet, binary_question};
    use rust_decimal_macros::dec;

    #[test]
    fn missing_file_is_an_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn save_then_load_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let snapshot = Snapshot {
            participants: vec![Participant::new("a", "Alice")],
            questions: vec![binary_question("q-1")],
            bets: vec![bet("a", "q-1", "Yes", dec!(10))],
            obligations: Vec::new(),
        };

        snapshot.save(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(Snapshot::load(&path).unwrap(), snapshot);
    }

    #[test]
    fn bet_on_unknown_question_is_rejected() {
        let json = serde_json::to_string(&Snapshot {
            bets: vec![bet("a", "q-9", "Yes", dec!(10))],
            ..Snapshot::default()
        })
        .unwrap();

        let err = Snapshot::parse_json(&json).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::Snapshot(_))));
    }

    #[test]
    fn invalid_stake_in_file_is_rejected() {
        let mut value = serde_json::to_value(Snapshot {
            questions: vec![binary_question("q-1")],
            bets: vec![bet("a", "q-1", "Yes", dec!(10))],
            ..Snapshot::default()
        })
        .unwrap();
        value["bets"][0]["stake"] = serde_json::json!("-5");

        let err = Snapshot::parse_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("bet b-a-q-1"));
    }
}
