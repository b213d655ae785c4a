//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! The only infrastructure dependency of the engine is the external
//! relational store that owns questions, bets and obligations.

pub mod store;
