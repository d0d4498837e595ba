//! Error types shared across every commish crate.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CommishError>;

/// All the ways the bot can fail.
///
/// Trigger callbacks are the error boundary: nothing here escapes a ticker
/// uncaught. The league never sees an error message in-channel; operators
/// read the logs.
#[derive(Debug, Error)]
pub enum CommishError {
    /// Remote season/team/scoreboard fetch failed. Retried on the next
    /// scheduled trigger; the current tick skips its dependent logic.
    #[error("fantasy data source error: {0}")]
    DataSource(String),

    /// A derived statistic was requested for a week with no recorded
    /// scoreboard. Ordering bug in the caller, should not happen mid-season.
    #[error("no scoreboard recorded for week {0}")]
    NoScoreboard(u32),

    /// Durable store I/O failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Chat platform delivery or lookup failure.
    #[error("channel error: {0}")]
    Channel(String),

    /// Config file unreadable or unparsable.
    #[error("config error: {0}")]
    Config(String),

    /// A required external identifier (channel, guild, league) could not be
    /// resolved at startup. Fatal: the process must not proceed.
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
