//! Leaderboard ranking.
//!
//! Aggregates each participant's resolved bets in a trailing window into
//! total winnings and win rate, then assigns competition ranks: tied
//! winnings share a rank and the following rank skips accordingly.
//! Within a tie, rows are ordered by participant ID so output is stable.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::error::ValidationError;
use crate::domain::money::{checked_add, percentage};
use crate::domain::{
    Amount, Bet, EventId, LeaderboardEntry, Outcome, Participant, ParticipantId, Period,
};

/// Which bets a leaderboard covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub period: Period,
    /// Restrict to a single event's bets.
    pub event_id: Option<EventId>,
}

impl LeaderboardQuery {
    #[must_use]
    pub fn new(period: Period) -> Self {
        Self {
            period,
            event_id: None,
        }
    }

    #[must_use]
    pub fn for_event(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    fn includes(&self, bet: &Bet, window_start: Option<DateTime<Utc>>) -> bool {
        bet.is_resolved()
            && window_start.map_or(true, |start| bet.created_at() >= start)
            && self
                .event_id
                .as_ref()
                .map_or(true, |event| bet.event_id() == event)
    }
}

#[derive(Default)]
struct Tally {
    winnings: Amount,
    bets: u32,
    won: u32,
}

/// Rank `participants` by their resolved bets matching `query` at `now`.
///
/// Participants without a resolved bet in the window are left out.
/// Bets of participants not in the list are ignored.
pub fn compute_leaderboard(
    participants: &[Participant],
    bets: &[Bet],
    query: &LeaderboardQuery,
    now: DateTime<Utc>,
) -> Result<Vec<LeaderboardEntry>, ValidationError> {
    let window_start = query.period.window_start(now);

    let mut tallies: HashMap<&ParticipantId, Tally> = HashMap::new();
    for bet in bets.iter().filter(|b| query.includes(b, window_start)) {
        let tally = tallies.entry(bet.participant_id()).or_default();
        tally.bets = tally.bets.saturating_add(1);
        if bet.outcome() == Some(Outcome::Won) {
            tally.won = tally.won.saturating_add(1);
            let winnings = bet.realized_winnings().unwrap_or(Decimal::ZERO);
            tally.winnings = checked_add(tally.winnings, winnings, "leaderboard winnings")?;
        }
    }

    let mut seen = HashSet::new();
    let mut entries: Vec<LeaderboardEntry> = participants
        .iter()
        .filter(|p| seen.insert(&p.id))
        .filter_map(|p| {
            let tally = tallies.get(&p.id)?;
            Some(LeaderboardEntry {
                participant_id: p.id.clone(),
                name: p.name.clone(),
                total_winnings: tally.winnings,
                total_bets: tally.bets,
                won_bets: tally.won,
                win_rate: percentage(Decimal::from(tally.won), Decimal::from(tally.bets)),
                rank: 0,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_winnings
            .cmp(&a.total_winnings)
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });

    let mut previous: Option<Amount> = None;
    let mut rank = 0;
    for (index, entry) in entries.iter_mut().enumerate() {
        if previous != Some(entry.total_winnings) {
            rank = u32::try_from(index + 1).unwrap_or(u32::MAX);
            previous = Some(entry.total_winnings);
        }
        entry.rank = rank;
    }

    debug!(
        period = %query.period,
        event_id = ?query.event_id,
        ranked = entries.len(),
        "Leaderboard computed"
    );

    Ok(entries)
}

/// Rank of `participant` on a computed leaderboard.
#[must_use]
pub fn rank_of(entries: &[LeaderboardEntry], participant: &ParticipantId) -> Option<u32> {
    entries
        .iter()
        .find(|e| &e.participant_id == participant)
        .map(|e| e.rank)
}
