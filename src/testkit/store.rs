//! Seeded in-memory stores.

use std::sync::Arc;

use crate::adapter::outbound::memory::MemoryStore;
use crate::application::placement::BetLimits;
use crate::application::service::WagerService;
use crate::domain::{Participant, Question};

/// Create a store holding `participants` (named after their IDs) and `questions`.
pub fn seeded(participants: &[&str], questions: Vec<Question>) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for id in participants {
        store.add_participant(Participant::new(*id, id.to_uppercase()));
    }
    for question in questions {
        store.add_question(question);
    }
    Arc::new(store)
}

/// Create a service with default limits over a seeded store.
pub fn service(participants: &[&str], questions: Vec<Question>) -> WagerService<MemoryStore> {
    WagerService::new(seeded(participants, questions), BetLimits::default())
}
