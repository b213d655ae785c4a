//! Outbound adapters (driven side).

pub mod memory;
pub mod snapshot;
