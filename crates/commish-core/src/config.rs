//! Commish configuration system.
//!
//! Everything the bot needs to know about the outside world lives here and is
//! passed in by constructor injection. No component reads config at module
//! load; the environment decision (dev mode, cadence overrides) is made once
//! at the CLI boundary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CommishError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommishConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub fantasy: FantasyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub onboarding: OnboardingConfig,
    #[serde(default)]
    pub punishments: PunishmentConfig,
}

impl CommishConfig {
    /// Load config from the default path (~/.commish/config.toml), or
    /// defaults if no file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CommishError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CommishError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the commish home directory (~/.commish).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".commish")
    }
}

/// Discord identifiers and credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub application_id: String,
    #[serde(default)]
    pub guild_id: String,
    /// Channel for league-wide announcements.
    #[serde(default)]
    pub main_channel_id: String,
    /// Announcement channel used instead of the main one in dev mode.
    #[serde(default)]
    pub test_channel_id: String,
    /// Where losers post their shotgun videos.
    #[serde(default)]
    pub shotgun_channel_id: String,
    /// Where the biggest loser posts punishment proof.
    #[serde(default)]
    pub punishments_channel_id: String,
}

/// Fantasy data source credentials and league identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FantasyConfig {
    #[serde(default)]
    pub league_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_fantasy_base_url")]
    pub base_url: String,
}

fn default_fantasy_base_url() -> String {
    "https://fantasysports.yahooapis.com/fantasy/v2".into()
}

impl Default for FantasyConfig {
    fn default() -> Self {
        Self {
            league_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            base_url: default_fantasy_base_url(),
        }
    }
}

impl FantasyConfig {
    /// League key in the data source's namespace, e.g. "nfl.l.12345".
    pub fn league_key(&self) -> String {
        format!("nfl.l.{}", self.league_id)
    }
}

/// Durable storage location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "~/.commish/data".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Cron cadence for each recurring trigger (five-field expressions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Weekly tick that advances the season. Tuesday 9am.
    #[serde(default = "default_new_week")]
    pub new_week: String,
    /// Onboarding nags, twice daily.
    #[serde(default = "default_onboarding")]
    pub onboarding: String,
    /// Picks punishment options for the biggest loser. Wednesday 9am.
    #[serde(default = "default_punishment_picker")]
    pub punishment_picker: String,
    /// Nags outstanding punishments, every day but Tuesday.
    #[serde(default = "default_punishment_remind")]
    pub punishment_remind: String,
}

fn default_new_week() -> String {
    "0 9 * * 2".into()
}
fn default_onboarding() -> String {
    "0 10,22 * * *".into()
}
fn default_punishment_picker() -> String {
    "0 9 * * 3".into()
}
fn default_punishment_remind() -> String {
    "0 9 * * 0,1,3,4,5,6".into()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            new_week: default_new_week(),
            onboarding: default_onboarding(),
            punishment_picker: default_punishment_picker(),
            punishment_remind: default_punishment_remind(),
        }
    }
}

impl ScheduleConfig {
    /// Every-minute cadence for all triggers. Decided at the CLI boundary,
    /// never inside a component.
    pub fn debug() -> Self {
        let every_minute = "* * * * *".to_string();
        Self {
            new_week: every_minute.clone(),
            onboarding: every_minute.clone(),
            punishment_picker: every_minute.clone(),
            punishment_remind: every_minute,
        }
    }
}

/// Links and amounts quoted in onboarding reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingConfig {
    #[serde(default)]
    pub submissions_url: String,
    #[serde(default)]
    pub poll_url: String,
    #[serde(default)]
    pub vetoes_url: String,
    #[serde(default = "default_buy_in")]
    pub buy_in: String,
}

fn default_buy_in() -> String {
    "$50".into()
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            submissions_url: String::new(),
            poll_url: String::new(),
            vetoes_url: String::new(),
            buy_in: default_buy_in(),
        }
    }
}

/// Punishment selection knobs. The selection policy itself is still a
/// product decision; only the count is configurable today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunishmentConfig {
    /// How many options the picker offers the biggest loser each cycle.
    #[serde(default = "default_picks_per_cycle")]
    pub picks_per_cycle: usize,
}

fn default_picks_per_cycle() -> usize {
    2
}

impl Default for PunishmentConfig {
    fn default() -> Self {
        Self {
            picks_per_cycle: default_picks_per_cycle(),
        }
    }
}
