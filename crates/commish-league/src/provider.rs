//! The league provider: cached season facts and the queries derived from
//! them.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use commish_core::error::{CommishError, Result};
use commish_core::types::{Phase, WeekAdvance};

use crate::client::{FantasySource, Scoreboard, Team};

/// Everything the bot knows about the season, rebuilt wholesale on every
/// refresh and never partially mutated.
#[derive(Debug, Clone)]
pub struct SeasonSnapshot {
    pub name: String,
    pub phase: Phase,
    pub current_week: u32,
    pub season_start: Option<DateTime<Utc>>,
    pub season_end: Option<DateTime<Utc>>,
    pub teams: Vec<Team>,
    /// Scoreboards by week, 1 through the current week.
    pub scoreboards: BTreeMap<u32, Scoreboard>,
}

impl SeasonSnapshot {
    fn scoreboard_at(&self, week: u32) -> Result<&Scoreboard> {
        self.scoreboards
            .get(&week)
            .ok_or(CommishError::NoScoreboard(week))
    }

    /// Teams that lost their matchup in `week`, with the points they scored.
    pub fn week_losers(&self, week: u32) -> Result<Vec<(String, f64)>> {
        let scoreboard = self.scoreboard_at(week)?;
        Ok(scoreboard
            .matchups
            .iter()
            .filter_map(|m| m.loser())
            .map(|(id, points)| (id.to_string(), points))
            .collect())
    }

    /// Teams that won their matchup in `week`.
    pub fn week_winners(&self, week: u32) -> Result<Vec<String>> {
        let scoreboard = self.scoreboard_at(week)?;
        Ok(scoreboard
            .matchups
            .iter()
            .filter_map(|m| m.winner())
            .map(|(id, _)| id.to_string())
            .collect())
    }

    /// The losing team with strictly minimal points in `week`. Ties go to
    /// the first team encountered in matchup order.
    pub fn week_biggest_loser(&self, week: u32) -> Result<String> {
        let losers = self.week_losers(week)?;
        let mut biggest: Option<(String, f64)> = None;
        for (team_id, points) in losers {
            match &biggest {
                Some((_, min_points)) if points >= *min_points => {}
                _ => biggest = Some((team_id, points)),
            }
        }
        biggest
            .map(|(team_id, _)| team_id)
            .ok_or(CommishError::NoScoreboard(week))
    }
}

/// The season data provider.
///
/// Holds the latest [`SeasonSnapshot`] and talks to the remote source to
/// rebuild it. Construction performs the initial load, so a `League` always
/// has a snapshot to answer from.
pub struct League {
    source: Arc<dyn FantasySource>,
    league_key: String,
    snapshot: SeasonSnapshot,
}

impl League {
    /// Fetch season settings, roster and scoreboard history, and return a
    /// loaded provider.
    pub async fn load(source: Arc<dyn FantasySource>, league_key: &str) -> Result<Self> {
        let snapshot = build_snapshot(source.as_ref(), league_key, &BTreeMap::new()).await?;
        tracing::info!(
            "🏈 League '{}' loaded: week {} ({})",
            snapshot.name,
            snapshot.current_week,
            snapshot.phase
        );
        Ok(Self {
            source,
            league_key: league_key.to_string(),
            snapshot,
        })
    }

    /// Pull the latest season state from the remote source, replacing the
    /// snapshot. Past weeks' scoreboards are immutable, so any already
    /// cached are carried over instead of re-fetched.
    ///
    /// The cached week number is NOT touched here: the counter moves only
    /// through [`League::advance_week`], so a refresh that lands after the
    /// remote source rolled over cannot swallow the advance announcement.
    pub async fn refresh(&mut self) -> Result<()> {
        let cached_week = self.snapshot.current_week;
        let mut snapshot =
            build_snapshot(self.source.as_ref(), &self.league_key, &self.snapshot.scoreboards)
                .await?;
        snapshot.current_week = cached_week;
        self.snapshot = snapshot;
        Ok(())
    }

    /// Advance to the week the remote source reports.
    ///
    /// The precondition check is the idempotency guard against double-fired
    /// triggers: if the remote week does not strictly exceed the cached one,
    /// nothing changes and the caller gets [`WeekAdvance::AlreadyCurrent`].
    pub async fn advance_week(&mut self) -> Result<WeekAdvance> {
        let meta = self.source.metadata(&self.league_key).await?;
        if meta.current_week <= self.snapshot.current_week {
            return Ok(WeekAdvance::AlreadyCurrent);
        }

        self.refresh().await?;
        self.snapshot.current_week = meta.current_week;
        tracing::info!("📅 Advanced to week {}", self.snapshot.current_week);
        Ok(WeekAdvance::Advanced(self.snapshot.current_week))
    }

    pub fn snapshot(&self) -> &SeasonSnapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> Phase {
        self.snapshot.phase
    }

    pub fn current_week(&self) -> u32 {
        self.snapshot.current_week
    }

    pub fn name(&self) -> &str {
        &self.snapshot.name
    }

    pub fn season_start(&self) -> Option<DateTime<Utc>> {
        self.snapshot.season_start
    }

    pub fn teams(&self) -> &[Team] {
        &self.snapshot.teams
    }

    /// Losers of the previous week's matchups (team ids).
    pub fn previous_week_losers(&self) -> Result<Vec<String>> {
        let week = self.snapshot.current_week.saturating_sub(1);
        Ok(self
            .snapshot
            .week_losers(week)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    /// Winners of the previous week's matchups (team ids).
    pub fn previous_week_winners(&self) -> Result<Vec<String>> {
        let week = self.snapshot.current_week.saturating_sub(1);
        self.snapshot.week_winners(week)
    }

    /// The previous week's losing team with the fewest points.
    pub fn previous_week_biggest_loser(&self) -> Result<String> {
        let week = self.snapshot.current_week.saturating_sub(1);
        self.snapshot.week_biggest_loser(week)
    }

    /// Ordered (team id, display name) pairs for the claim command choices.
    pub fn team_claim_choices(&self) -> Vec<(String, String)> {
        self.snapshot
            .teams
            .iter()
            .map(|t| (t.team_id.clone(), t.name.clone()))
            .collect()
    }
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

async fn build_snapshot(
    source: &dyn FantasySource,
    league_key: &str,
    known_scoreboards: &BTreeMap<u32, Scoreboard>,
) -> Result<SeasonSnapshot> {
    let settings = source.settings(league_key).await?;
    let teams = source.teams(league_key).await?;

    // Loser and biggest-loser queries need the previous week's matchups, so
    // once more than one week has elapsed the whole history back to week 1
    // must be on hand. Weeks before the current one are final and are only
    // fetched the first time they are seen.
    let mut scoreboards = BTreeMap::new();
    for week in 1..=settings.current_week {
        if week < settings.current_week {
            if let Some(cached) = known_scoreboards.get(&week) {
                scoreboards.insert(week, cached.clone());
                continue;
            }
        }
        let scoreboard = source.scoreboard(league_key, Some(week)).await?;
        scoreboards.insert(week, scoreboard);
    }

    Ok(SeasonSnapshot {
        name: settings.name,
        phase: Phase::from_wire(&settings.draft_status),
        current_week: settings.current_week,
        season_start: settings.start_date.and_then(midnight_utc),
        season_end: settings.end_date.and_then(midnight_utc),
        teams,
        scoreboards,
    })
}
