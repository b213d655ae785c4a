//! String identifiers for participants, questions, events and bets.
//!
//! Identity is owned by the external store; the engine only compares,
//! orders and displays these values. Each one serializes as a plain string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declare an ordered, serde-transparent string newtype.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Someone who places bets.
    ParticipantId
);

string_id!(
    /// A question within an event.
    QuestionId
);

string_id!(
    /// Groups questions; events themselves are managed elsewhere.
    EventId
);

string_id!(
    /// A single bet. New bets get a UUID v4.
    BetId
);

impl BetId {
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_ids_order_lexicographically() {
        assert!(ParticipantId::from("alice") < ParticipantId::from("bob"));
    }

    #[test]
    fn display_is_the_raw_id() {
        assert_eq!(QuestionId::new("q-1").to_string(), "q-1");
    }

    #[test]
    fn generated_bet_ids_are_distinct_uuids() {
        let first = BetId::generate();
        assert_ne!(first, BetId::generate());
        assert!(uuid::Uuid::parse_str(first.as_str()).is_ok());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&EventId::new("wedding")).unwrap();
        assert_eq!(json, "\"wedding\"");
        let back: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "wedding");
    }
}
