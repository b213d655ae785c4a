//! Application services (use cases).
//!
//! The engine functions (`odds`, `placement`, `resolver`, `settlement`,
//! `leaderboard`) are pure: they take fetched data and return results
//! ready to persist. [`service::WagerService`] wires them to a store.

pub mod leaderboard;
pub mod odds;
pub mod placement;
pub mod resolver;
pub mod service;
pub mod settlement;

pub use service::WagerService;
