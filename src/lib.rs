//! Betsettle - pari-mutuel pool settlement for social wagering.
//!
//! Participants stake money on the answer to a question. When the
//! question resolves, everyone who picked the correct answer splits the
//! whole pool in proportion to their stake, and the losers' stakes are
//! netted into payer -> payee debts. Rankings aggregate realized winnings
//! over trailing windows.
//!
//! # Modules
//!
//! - [`domain`] - Questions, bets, pools, payout math, obligations
//! - [`application`] - Odds, bet placement, resolution, settlement netting,
//!   leaderboard ranking, and the [`WagerService`](application::WagerService)
//!   orchestrating them over a store
//! - [`port`] - The [`WagerStore`](port::WagerStore) persistence contract
//! - [`adapter`] - In-memory store, JSON snapshots, and the CLI
//! - [`infrastructure`] - Configuration loading and logging setup
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use betsettle::domain::payout::potential_winnings;
//! use rust_decimal_macros::dec;
//!
//! // 25 staked on an answer holding 55 of a 70 pool.
//! assert_eq!(potential_winnings(dec!(25), dec!(70), dec!(55)), Ok(dec!(31.82)));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
