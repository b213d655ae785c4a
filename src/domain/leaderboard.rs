//! Leaderboard types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ParticipantId;
use super::money::Amount;

/// Trailing time window a leaderboard is computed over.
///
/// Windows are rolling, not calendar-aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    AllTime,
    /// Last 30 days.
    Monthly,
    /// Last 7 days.
    Weekly,
}

impl Period {
    /// Length of the trailing window, `None` for all time.
    #[must_use]
    pub fn window(self) -> Option<Duration> {
        match self {
            Self::AllTime => None,
            Self::Monthly => Some(Duration::days(30)),
            Self::Weekly => Some(Duration::days(7)),
        }
    }

    /// Earliest bet creation time included at `now`.
    #[must_use]
    pub fn window_start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window().map(|w| now - w)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AllTime => "all_time",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        };
        f.write_str(label)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all_time" | "all" => Ok(Self::AllTime),
            "monthly" | "month" => Ok(Self::Monthly),
            "weekly" | "week" => Ok(Self::Weekly),
            other => Err(format!("unknown period '{other}'")),
        }
    }
}

/// A participant as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub participant_id: ParticipantId,
    pub name: String,
    /// Sum of realized winnings over won bets in the window.
    pub total_winnings: Amount,
    /// Resolved bets in the window.
    pub total_bets: u32,
    pub won_bets: u32,
    /// Percentage of resolved bets won, two decimal places.
    pub win_rate: Decimal,
    /// Competition rank, 1-based; ties share a rank.
    pub rank: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn weekly_window_starts_seven_days_back() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let start = Period::Weekly.window_start(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 8, 12, 0, 0).unwrap());
    }

    #[test]
    fn monthly_is_thirty_rolling_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let start = Period::Monthly.window_start(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn all_time_has_no_window() {
        assert!(Period::AllTime.window_start(Utc::now()).is_none());
    }

    #[test]
    fn period_parses_common_spellings() {
        assert_eq!("all-time".parse::<Period>().unwrap(), Period::AllTime);
        assert_eq!("Weekly".parse::<Period>().unwrap(), Period::Weekly);
        assert!("yearly".parse::<Period>().is_err());
    }
}
