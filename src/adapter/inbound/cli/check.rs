//! Configuration check.

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::infrastructure::config::Config;

/// Report the effective configuration. Loading already validated it.
pub fn execute_config(config: &Config) {
    let max_stake = config
        .betting
        .max_stake
        .map_or_else(|| "unlimited".to_string(), |m| m.to_string());

    output::json_output(&json!({
        "command": "check-config",
        "valid": true,
        "data": config.data,
        "min_stake": config.betting.min_stake,
        "max_stake": config.betting.max_stake,
        "default_period": config.leaderboard.default_period,
        "log_level": config.logging.level,
        "log_format": config.logging.format,
    }));

    output::section("Configuration Check");
    output::success("Configuration is valid");
    output::field("Data", &config.data);
    output::field("Min stake", config.betting.min_stake);
    output::field("Max stake", max_stake);
    output::field("Leaderboard", config.leaderboard.default_period);
    output::field(
        "Logging",
        format!("{} ({})", config.logging.level, config.logging.format),
    );
}
