//! Command-line interface definitions.
//!
//! Every command works on the JSON snapshot named by the `data` setting:
//! it is loaded before the command runs and written back after commands
//! that change state.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::domain::{ObligationStatus, Period, QuestionKind};

/// Pari-mutuel wagering pools: odds, resolution, settlement and leaderboards
#[derive(Parser, Debug)]
#[command(name = "betsettle")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (defaults apply when it is missing)
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a participant or change their display name
    AddParticipant(AddParticipantArgs),

    /// Create a question open for betting
    AddQuestion(AddQuestionArgs),

    /// Show live odds for a question
    Odds(OddsArgs),

    /// Place a bet
    Bet(BetArgs),

    /// Close betting on a question
    Close(QuestionArg),

    /// Resolve a question with its correct answer
    Resolve(ResolveArgs),

    /// Generate settlement obligations for a resolved question
    Settle(QuestionArg),

    /// Generate settlement obligations for every resolved question of an event
    SettleEvent(EventArg),

    /// Complete or dispute a settlement obligation
    Obligation(ObligationArgs),

    /// Show obligations and net balances for a question
    Balances(QuestionArg),

    /// Rank participants by winnings
    Leaderboard(LeaderboardArgs),

    /// Validate the configuration and show effective settings
    CheckConfig,
}

#[derive(Args, Debug)]
pub struct QuestionArg {
    /// Question ID
    pub question: String,
}

#[derive(Args, Debug)]
pub struct EventArg {
    /// Event ID
    pub event: String,
}

#[derive(Args, Debug)]
pub struct AddParticipantArgs {
    /// Participant ID
    pub id: String,
    /// Display name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct AddQuestionArgs {
    /// Question ID
    pub id: String,

    /// Event the question belongs to
    #[arg(long)]
    pub event: String,

    /// Question text
    #[arg(long)]
    pub title: String,

    /// Answer type
    #[arg(long, value_enum, default_value = "binary")]
    pub kind: KindArg,

    /// Answer label (repeat for each option)
    #[arg(long = "option")]
    pub options: Vec<String>,

    /// Betting deadline (RFC 3339)
    #[arg(long)]
    pub closes_at: DateTime<Utc>,
}

/// Question kinds accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Binary,
    MultipleChoice,
    Numeric,
    FreeText,
}

impl From<KindArg> for QuestionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Binary => Self::Binary,
            KindArg::MultipleChoice => Self::MultipleChoice,
            KindArg::Numeric => Self::Numeric,
            KindArg::FreeText => Self::FreeText,
        }
    }
}

#[derive(Args, Debug)]
pub struct OddsArgs {
    /// Question ID
    pub question: String,

    /// Preview a bet on this answer
    #[arg(long, requires = "stake")]
    pub answer: Option<String>,

    /// Stake of the previewed bet
    #[arg(long, requires = "answer")]
    pub stake: Option<Decimal>,
}

#[derive(Args, Debug)]
pub struct BetArgs {
    /// Participant placing the bet
    pub participant: String,
    /// Question ID
    pub question: String,
    /// Chosen answer
    pub answer: String,
    /// Stake
    pub stake: Decimal,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Question ID
    pub question: String,
    /// Correct answer
    pub answer: String,
}

#[derive(Args, Debug)]
pub struct ObligationArgs {
    /// Participant who owes
    pub payer: String,
    /// Participant who is owed
    pub payee: String,
    /// Question the obligation arose from
    pub question: String,
    /// New status
    #[arg(value_enum)]
    pub action: ObligationAction,
}

/// Obligation transitions available from the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ObligationAction {
    Complete,
    Dispute,
}

impl From<ObligationAction> for ObligationStatus {
    fn from(action: ObligationAction) -> Self {
        match action {
            ObligationAction::Complete => Self::Completed,
            ObligationAction::Dispute => Self::Disputed,
        }
    }
}

#[derive(Args, Debug)]
pub struct LeaderboardArgs {
    /// Window: all-time, monthly or weekly (defaults to configuration)
    #[arg(long)]
    pub period: Option<Period>,

    /// Only count bets from this event
    #[arg(long)]
    pub event: Option<String>,
}
