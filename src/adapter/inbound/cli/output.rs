//! CLI output formatting.
//!
//! Human-readable output uses colored symbols and indented fields. JSON
//! mode prints one document per command on stdout for scripting, and
//! quiet mode suppresses everything except warnings and errors.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    /// Create a new output configuration.
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Check if regular output should be skipped (JSON or quiet mode).
fn regular_output_suppressed(config: OutputConfig) -> bool {
    config.json || config.quiet
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    write_config(config);
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
fn is_json() -> bool {
    read_config().json
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    if regular_output_suppressed(read_config()) {
        return;
    }
    println!(
        "  {:<14} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    if regular_output_suppressed(read_config()) {
        return;
    }
    println!(
        "  {} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        message
    );
}

/// Print a warning line to stderr.
pub fn warning(message: &str) {
    if is_json() {
        return;
    }
    eprintln!(
        "  {} {}",
        "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()),
        message
    );
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", serde_json::json!({ "error": message }));
        return;
    }
    eprintln!(
        "  {} {}",
        "×".if_supports_color(Stream::Stderr, |t| t.red()),
        message
    );
}

/// Print a section header.
pub fn section(title: &str) {
    if regular_output_suppressed(read_config()) {
        return;
    }
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a dimmed note.
pub fn note(message: &str) {
    if regular_output_suppressed(read_config()) {
        return;
    }
    println!(
        "  {}",
        message.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    if regular_output_suppressed(read_config()) {
        return;
    }
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit a JSON document (JSON mode only).
pub fn json_output(value: &serde_json::Value) {
    if is_json() {
        println!("{value}");
    }
}

/// Format a value in green.
pub fn positive(value: impl Display) -> String {
    value
        .to_string()
        .if_supports_color(Stream::Stdout, |t| t.green())
        .to_string()
}

/// Format a value in red.
pub fn negative(value: impl Display) -> String {
    value
        .to_string()
        .if_supports_color(Stream::Stdout, |t| t.red())
        .to_string()
}

/// Format a highlighted value in cyan.
pub fn highlight(value: impl Display) -> String {
    value
        .to_string()
        .if_supports_color(Stream::Stdout, |t| t.cyan())
        .to_string()
}
