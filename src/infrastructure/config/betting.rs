//! Bet placement configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::placement::BetLimits;
use crate::domain::MIN_UNIT;

/// Stake limits applied when placing bets.
#[derive(Debug, Clone, Deserialize)]
pub struct BettingConfig {
    /// Smallest accepted stake (default: one cent).
    #[serde(default = "default_min_stake")]
    pub min_stake: Decimal,
    /// Largest accepted stake. Unlimited when absent.
    #[serde(default)]
    pub max_stake: Option<Decimal>,
}

fn default_min_stake() -> Decimal {
    MIN_UNIT
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            min_stake: default_min_stake(),
            max_stake: None,
        }
    }
}

impl From<&BettingConfig> for BetLimits {
    fn from(config: &BettingConfig) -> Self {
        Self {
            min_stake: config.min_stake,
            max_stake: config.max_stake,
        }
    }
}
