//! Operator CLI over a JSON snapshot.

pub mod check;
pub mod command;
pub mod leaderboard;
pub mod output;
pub mod settle;
pub mod wager;

use std::sync::Arc;

use crate::adapter::outbound::memory::MemoryStore;
use crate::adapter::outbound::snapshot::Snapshot;
use crate::application::service::WagerService;
use crate::error::Result;
use crate::infrastructure::config::Config;
use command::Commands;

/// Loaded state a command runs against.
pub struct Context {
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub service: WagerService<MemoryStore>,
}

impl Context {
    /// Load the snapshot named by `config`.
    pub fn open(config: Config) -> Result<Self> {
        let snapshot = Snapshot::load(&config.data)?;
        let store = Arc::new(MemoryStore::from_snapshot(snapshot));
        let service = WagerService::new(Arc::clone(&store), config.bet_limits());
        Ok(Self {
            config,
            store,
            service,
        })
    }

    /// Write the store back to the snapshot file.
    pub fn save(&self) -> Result<()> {
        self.store.snapshot().save(&self.config.data)
    }
}

/// Run one command.
pub async fn run(command: Commands, config: Config) -> Result<()> {
    if let Commands::CheckConfig = command {
        check::execute_config(&config);
        return Ok(());
    }

    let ctx = Context::open(config)?;
    match command {
        Commands::AddParticipant(args) => wager::add_participant(&ctx, args)?,
        Commands::AddQuestion(args) => wager::add_question(&ctx, args)?,
        Commands::Odds(args) => wager::odds(&ctx, args).await?,
        Commands::Bet(args) => wager::bet(&ctx, args).await?,
        Commands::Close(args) => wager::close(&ctx, args).await?,
        Commands::Resolve(args) => wager::resolve(&ctx, args).await?,
        Commands::Settle(args) => settle::question(&ctx, args).await?,
        Commands::SettleEvent(args) => settle::event(&ctx, args).await?,
        Commands::Obligation(args) => settle::obligation(&ctx, args).await?,
        Commands::Balances(args) => settle::balances(&ctx, args).await?,
        Commands::Leaderboard(args) => leaderboard::execute(&ctx, args).await?,
        Commands::CheckConfig => {}
    }
    Ok(())
}
