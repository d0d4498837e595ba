//! Fantasy platform client: remote league, roster and scoreboard queries.

use async_trait::async_trait;
use chrono::NaiveDate;
use commish_core::config::FantasyConfig;
use commish_core::error::{CommishError, Result};
use serde::{Deserialize, Serialize};

/// League settings as reported by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueSettings {
    pub name: String,
    pub draft_status: String,
    pub current_week: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Lightweight league metadata, the authoritative source for the current
/// week when deciding whether to advance.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueMetadata {
    pub draft_status: String,
    pub current_week: u32,
}

/// One fantasy team in the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub number_of_trades: u32,
    #[serde(default)]
    pub draft_grade: Option<String>,
}

/// A week's scoreboard: every matchup and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoreboard {
    pub week: u32,
    pub matchups: Vec<Matchup>,
}

/// A head-to-head matchup, referenced by team id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub team_a: String,
    pub team_b: String,
    pub winner_team_id: String,
    pub points_a: f64,
    pub points_b: f64,
}

impl Matchup {
    /// The non-winner side: (team id, points scored).
    pub fn loser(&self) -> Option<(&str, f64)> {
        if self.winner_team_id == self.team_a {
            Some((&self.team_b, self.points_b))
        } else if self.winner_team_id == self.team_b {
            Some((&self.team_a, self.points_a))
        } else {
            tracing::warn!(
                "Matchup {} vs {} has winner '{}' matching neither side",
                self.team_a,
                self.team_b,
                self.winner_team_id
            );
            None
        }
    }

    /// The winner side: (team id, points scored).
    pub fn winner(&self) -> Option<(&str, f64)> {
        if self.winner_team_id == self.team_a {
            Some((&self.team_a, self.points_a))
        } else if self.winner_team_id == self.team_b {
            Some((&self.team_b, self.points_b))
        } else {
            None
        }
    }
}

/// The remote data-source boundary. Everything is a network call that may
/// fail; errors surface as [`CommishError::DataSource`] and the caller
/// decides whether to retry on its next trigger.
#[async_trait]
pub trait FantasySource: Send + Sync {
    async fn settings(&self, league_key: &str) -> Result<LeagueSettings>;
    async fn teams(&self, league_key: &str) -> Result<Vec<Team>>;
    async fn scoreboard(&self, league_key: &str, week: Option<u32>) -> Result<Scoreboard>;
    async fn metadata(&self, league_key: &str) -> Result<LeagueMetadata>;
}

/// Production HTTP client for the fantasy platform's JSON API.
pub struct FantasyApi {
    config: FantasyConfig,
    client: reqwest::Client,
}

impl FantasyApi {
    pub fn new(config: FantasyConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, league_key: &str, resource: &str) -> String {
        format!(
            "{}/league/{}/{}",
            self.config.base_url, league_key, resource
        )
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .query(&[("format", "json".to_string())])
            .query(query)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| CommishError::DataSource(format!("GET {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CommishError::DataSource(format!(
                "GET {url} returned {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CommishError::DataSource(format!("Malformed response from {url}: {e}")))
    }
}

#[async_trait]
impl FantasySource for FantasyApi {
    async fn settings(&self, league_key: &str) -> Result<LeagueSettings> {
        self.get(&self.api_url(league_key, "settings"), &[]).await
    }

    async fn teams(&self, league_key: &str) -> Result<Vec<Team>> {
        self.get(&self.api_url(league_key, "teams"), &[]).await
    }

    async fn scoreboard(&self, league_key: &str, week: Option<u32>) -> Result<Scoreboard> {
        let query: Vec<(&str, String)> = match week {
            Some(w) => vec![("week", w.to_string())],
            None => Vec::new(),
        };
        self.get(&self.api_url(league_key, "scoreboard"), &query)
            .await
    }

    async fn metadata(&self, league_key: &str) -> Result<LeagueMetadata> {
        self.get(&self.api_url(league_key, "metadata"), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matchup(a: &str, b: &str, winner: &str, pa: f64, pb: f64) -> Matchup {
        Matchup {
            team_a: a.into(),
            team_b: b.into(),
            winner_team_id: winner.into(),
            points_a: pa,
            points_b: pb,
        }
    }

    #[test]
    fn loser_is_the_non_winner_side() {
        let m = matchup("1", "2", "1", 101.2, 88.6);
        assert_eq!(m.loser(), Some(("2", 88.6)));
        assert_eq!(m.winner(), Some(("1", 101.2)));

        let m = matchup("1", "2", "2", 101.2, 110.0);
        assert_eq!(m.loser(), Some(("1", 101.2)));
    }

    #[test]
    fn unknown_winner_yields_no_loser() {
        let m = matchup("1", "2", "99", 10.0, 20.0);
        assert_eq!(m.loser(), None);
        assert_eq!(m.winner(), None);
    }

    #[test]
    fn api_url_shape() {
        let api = FantasyApi::new(FantasyConfig {
            league_id: "4242".into(),
            ..Default::default()
        });
        assert_eq!(
            api.api_url("nfl.l.4242", "scoreboard"),
            "https://fantasysports.yahooapis.com/fantasy/v2/league/nfl.l.4242/scoreboard"
        );
    }
}
