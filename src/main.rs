use clap::Parser;
use tracing::debug;

use betsettle::adapter::inbound::cli::command::{Cli, ColorChoice};
use betsettle::adapter::inbound::cli::output::{self, OutputConfig};
use betsettle::adapter::inbound::cli::run;
use betsettle::infrastructure::config::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::error(&format!("Failed to load config: {e}"));
            std::process::exit(1);
        }
    };

    config.init_logging();
    debug!(config = %cli.config.display(), data = %config.data, "betsettle starting");

    if let Err(e) = run(cli.command, config).await {
        debug!(error = ?e, "Command failed");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
