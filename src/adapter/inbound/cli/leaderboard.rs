//! Leaderboard command.

use chrono::Utc;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::LeaderboardArgs;
use super::{output, Context};
use crate::application::leaderboard::LeaderboardQuery;
use crate::domain::EventId;
use crate::error::Result;

#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "#")]
    rank: u32,
    #[tabled(rename = "Participant")]
    name: String,
    #[tabled(rename = "Winnings")]
    winnings: String,
    #[tabled(rename = "Bets")]
    bets: u32,
    #[tabled(rename = "Won")]
    won: u32,
    #[tabled(rename = "Win %")]
    win_rate: String,
}

/// Print the leaderboard.
pub async fn execute(ctx: &Context, args: LeaderboardArgs) -> Result<()> {
    let period = args
        .period
        .unwrap_or(ctx.config.leaderboard.default_period);
    let mut query = LeaderboardQuery::new(period);
    if let Some(event) = args.event {
        query = query.for_event(EventId::new(event));
    }

    let entries = ctx.service.leaderboard(&query, Utc::now()).await?;

    output::json_output(&json!({
        "command": "leaderboard",
        "period": period,
        "event_id": query.event_id,
        "entries": entries,
    }));

    output::section(&format!("Leaderboard ({period})"));
    if entries.is_empty() {
        output::note("No resolved bets in this window");
        return Ok(());
    }
    let rows: Vec<RankRow> = entries
        .iter()
        .map(|e| RankRow {
            rank: e.rank,
            name: e.name.clone(),
            winnings: e.total_winnings.to_string(),
            bets: e.total_bets,
            won: e.won_bets,
            win_rate: e.win_rate.to_string(),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
