//! Wagering domain types and pure pool math. No I/O.

pub mod bet;
pub mod error;
pub mod id;
pub mod leaderboard;
pub mod money;
pub mod payout;
pub mod pool;
pub mod question;
pub mod settlement;

pub use bet::{Bet, BetStatus, Outcome};
pub use id::{BetId, EventId, ParticipantId, QuestionId};
pub use leaderboard::{LeaderboardEntry, Participant, Period};
pub use money::{round_currency, Amount, CURRENCY_SCALE, MIN_UNIT};
pub use pool::Pool;
pub use question::{Question, QuestionKind, QuestionStatus};
pub use settlement::{net_balances, ObligationKey, ObligationStatus, SettlementObligation};
