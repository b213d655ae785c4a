//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; the snapshot path can be
//! overridden with the `BETSETTLE_DATA` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use betsettle::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::betting::BettingConfig;
use super::logging::LoggingConfig;
use crate::application::placement::BetLimits;
use crate::domain::Period;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::data`].
pub const DATA_ENV: &str = "BETSETTLE_DATA";

/// Leaderboard defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardConfig {
    /// Period used when a command does not name one.
    #[serde(default)]
    pub default_period: Period,
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Stake limits.
    #[serde(default)]
    pub betting: BettingConfig,

    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    /// Path to the JSON snapshot file.
    ///
    /// Defaults to "betsettle.json" in the current directory.
    #[serde(default = "default_data_path")]
    pub data: String,
}

fn default_data_path() -> String {
    "betsettle.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            betting: BettingConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            data: default_data_path(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation
    /// fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(data) = std::env::var(DATA_ENV) {
            if !data.trim().is_empty() {
                self.data = data;
            }
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.data.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "data" }.into());
        }
        if self.betting.min_stake <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "min_stake",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if let Some(max) = self.betting.max_stake {
            if max < self.betting.min_stake {
                return Err(ConfigError::InvalidValue {
                    field: "max_stake",
                    reason: "must be >= min_stake".to_string(),
                }
                .into());
            }
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: format!("expected 'pretty' or 'json', got '{}'", self.logging.format),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Stake limits for bet placement.
    #[must_use]
    pub fn bet_limits(&self) -> BetLimits {
        BetLimits::from(&self.betting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.betting.min_stake, dec!(0.01));
        assert_eq!(config.betting.max_stake, None);
        assert_eq!(config.leaderboard.default_period, Period::AllTime);
    }

    #[test]
    fn sections_are_parsed() {
        let config = Config::parse_toml(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [betting]
            min_stake = 1
            max_stake = 500

            [leaderboard]
            default_period = "weekly"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.betting.min_stake, dec!(1));
        assert_eq!(config.betting.max_stake, Some(dec!(500)));
        assert_eq!(config.leaderboard.default_period, Period::Weekly);

        let limits = config.bet_limits();
        assert_eq!(limits.min_stake, dec!(1));
        assert_eq!(limits.max_stake, Some(dec!(500)));
    }

    #[test]
    fn max_below_min_is_rejected() {
        let err = Config::parse_toml(
            r#"
            [betting]
            min_stake = 10
            max_stake = 5
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "max_stake",
                ..
            })
        ));
    }

    #[test]
    fn non_positive_min_stake_is_rejected() {
        let err = Config::parse_toml("[betting]\nmin_stake = 0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "min_stake",
                ..
            })
        ));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = Config::parse_toml("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { field: "format", .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse_toml("[betting\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }
}
