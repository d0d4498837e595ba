//! # Commish League
//! The season data provider.
//!
//! [`client`] is the remote boundary: a trait over the fantasy platform's
//! league/teams/scoreboard/metadata queries plus the production HTTP client.
//! [`provider`] owns the cached [`provider::SeasonSnapshot`] and derives
//! everything the commissioner asks about: phase, week, losers, the biggest
//! loser.

pub mod client;
pub mod provider;

pub use client::{FantasyApi, FantasySource, LeagueMetadata, LeagueSettings, Matchup, Scoreboard, Team};
pub use provider::{League, SeasonSnapshot};
