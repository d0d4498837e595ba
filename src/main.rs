//! # Commish
//!
//! Fantasy football league commissioner bot. Advances the season week on a
//! schedule, nags the league through preseason onboarding, and keeps the
//! punishment rotation honest.
//!
//! Usage:
//!   commish                          # Run with ~/.commish/config.toml
//!   commish --config ./league.toml   # Custom config
//!   commish --dev                    # Test channel + every-minute cadence

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use commish_bot::{Commissioner, OnboardingTracker, PunishmentTracker};
use commish_channels::DiscordClient;
use commish_core::config::ScheduleConfig;
use commish_core::CommishConfig;
use commish_league::{FantasyApi, League};
use commish_store::JsonStore;

#[derive(Parser)]
#[command(name = "commish", version, about = "Fantasy football league commissioner bot")]
struct Cli {
    /// Path to config file (default ~/.commish/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Data directory override
    #[arg(long)]
    data_dir: Option<String>,

    /// Dev mode: announce to the test channel, fire every trigger every
    /// minute
    #[arg(long)]
    dev: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn expand_path(p: &str) -> String {
    shellexpand::tilde(p).to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Load config; the environment decisions (dev cadence, dev channel) are
    // made here and nowhere else.
    let mut config = match &cli.config {
        Some(path) => CommishConfig::load_from(Path::new(&expand_path(path)))?,
        None => CommishConfig::load()?,
    };
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if cli.dev {
        tracing::info!("Dev mode: test channel, every-minute cadence");
        config.schedule = ScheduleConfig::debug();
    }

    // Durable state. A missing data directory is fatal: the bot must not
    // run without it.
    let data_dir = PathBuf::from(expand_path(&config.storage.data_dir));
    let owners = JsonStore::open(&data_dir, "owners.json")?;
    let onboarding_store = JsonStore::open(&data_dir, "onboarding.json")?;
    let punishments_store = JsonStore::open(&data_dir, "punishments.json")?;

    // Initial season load from the fantasy platform.
    let source = Arc::new(FantasyApi::new(config.fantasy.clone()));
    let league = League::load(source, &config.fantasy.league_key()).await?;
    tracing::info!(
        "League '{}' is in {} at week {}",
        league.name(),
        league.phase(),
        league.current_week()
    );

    let channel = Arc::new(DiscordClient::new(config.discord.clone(), cli.dev)?);

    let onboarding = OnboardingTracker::load(onboarding_store, config.onboarding.clone());
    tracing::info!(
        "Loaded onboarding: {} league steps complete",
        onboarding.league_steps().len()
    );
    let punishments = PunishmentTracker::load(punishments_store, config.punishments.clone());

    let mut commissioner = Commissioner::new(
        league,
        owners,
        onboarding,
        punishments,
        channel.clone(),
        config,
    );

    // Register the command surface before any trigger fires: the claim
    // command's choices come from the roster just loaded.
    let commands = commissioner.commands().await;
    channel.set_guild_commands(&commands).await?;

    commissioner.start().await;
    tracing::info!("🏈 Commissioner is on duty");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    Ok(())
}
