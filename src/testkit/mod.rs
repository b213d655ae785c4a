//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`]: builders for questions and bets in a known state.
//! - [`store`]: a [`MemoryStore`](crate::adapter::outbound::memory::MemoryStore)
//!   seeded with participants and questions.

pub mod domain;
pub mod store;
