use std::fs;
use std::path::PathBuf;

use rust_decimal_macros::dec;
use tempfile::TempDir;

use betsettle::domain::Period;
use betsettle::error::{ConfigError, Error};
use betsettle::infrastructure::config::Config;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn config_loads_all_sections() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
data = "pools.json"

[logging]
level = "info"
format = "json"

[betting]
min_stake = 0.50
max_stake = 100

[leaderboard]
default_period = "monthly"
"#,
    );

    let config = Config::load(&path).unwrap();

    assert_eq!(config.logging.format, "json");
    assert_eq!(config.betting.min_stake, dec!(0.50));
    assert_eq!(config.betting.max_stake, Some(dec!(100)));
    assert_eq!(config.leaderboard.default_period, Period::Monthly);
    if std::env::var("BETSETTLE_DATA").is_err() {
        assert_eq!(config.data, "pools.json");
    }
}

#[test]
fn config_rejects_inverted_stake_limits() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[betting]\nmin_stake = 5\nmax_stake = 1\n");

    match Config::load(&path) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "max_stake",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid max_stake error, got {err}"),
        Ok(config) => panic!(
            "Expected inverted limits to be rejected, got max {:?}",
            config.betting.max_stake
        ),
    }
}

#[test]
fn config_rejects_unknown_period() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[leaderboard]\ndefault_period = \"daily\"\n");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn missing_file_is_a_read_error_but_defaults_on_request() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config.betting.min_stake, dec!(0.01));
    assert_eq!(config.leaderboard.default_period, Period::AllTime);
}
