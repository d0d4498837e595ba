//! The commissioner: owns the recurring triggers and drives the season.
//!
//! Four independent tickers share the season provider and the trackers. Only
//! the new-week tick mutates the league's phase and week, so cross-ticker
//! write conflicts cannot happen; everything else reads its own tracker's
//! document. Each ticker catches its own errors, so one bad tick never
//! silences the schedule.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use commish_channels::{commands, DeliveryChannel, Member};
use commish_core::config::CommishConfig;
use commish_core::error::{CommishError, Result};
use commish_core::types::{Phase, WeekAdvance};
use commish_league::League;
use commish_scheduler::{Ticker, TickerHandle};
use commish_store::JsonStore;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::embeds;
use crate::onboarding::OnboardingTracker;
use crate::punishments::PunishmentTracker;

/// What a post-draft new-week tick should do, derived purely from the
/// season start date and the tick time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewWeekAction {
    /// Season start is beyond the coming week: nothing due yet.
    DraftCompleteWaiting,
    /// Season start falls within the coming week.
    SeasonStartsSoon,
    /// The season is underway: advance the week counter.
    AdvanceWeek,
}

/// Decide the new-week branch for a post-draft tick.
pub fn new_week_action(season_start: DateTime<Utc>, now: DateTime<Utc>) -> NewWeekAction {
    let next_week = now + Duration::days(7);
    if season_start >= next_week {
        NewWeekAction::DraftCompleteWaiting
    } else if season_start >= now {
        NewWeekAction::SeasonStartsSoon
    } else {
        NewWeekAction::AdvanceWeek
    }
}

/// The season orchestrator.
pub struct Commissioner {
    ctx: Arc<TickContext>,
    new_week: Ticker,
    onboarding: Ticker,
    punishment_picker: Ticker,
    punishment_remind: Ticker,
}

/// Shared state reachable from ticker callbacks.
struct TickContext {
    league: Arc<Mutex<League>>,
    owners: JsonStore,
    onboarding: Arc<Mutex<OnboardingTracker>>,
    punishments: Arc<Mutex<PunishmentTracker>>,
    channel: Arc<dyn DeliveryChannel>,
    config: CommishConfig,
    onboarding_handle: TickerHandle,
    onboarding_active: AtomicBool,
}

impl Commissioner {
    pub fn new(
        league: League,
        owners: JsonStore,
        onboarding_tracker: OnboardingTracker,
        punishment_tracker: PunishmentTracker,
        channel: Arc<dyn DeliveryChannel>,
        config: CommishConfig,
    ) -> Self {
        let schedule = config.schedule.clone();
        let new_week = Ticker::new("new-week", &schedule.new_week);
        let onboarding = Ticker::new("onboarding", &schedule.onboarding);
        let punishment_picker = Ticker::new("punishment-picker", &schedule.punishment_picker);
        let punishment_remind = Ticker::new("punishment-remind", &schedule.punishment_remind);

        let ctx = Arc::new(TickContext {
            league: Arc::new(Mutex::new(league)),
            owners,
            onboarding: Arc::new(Mutex::new(onboarding_tracker)),
            punishments: Arc::new(Mutex::new(punishment_tracker)),
            channel,
            config,
            onboarding_handle: onboarding.handle(),
            onboarding_active: AtomicBool::new(false),
        });

        Self {
            ctx,
            new_week,
            onboarding,
            punishment_picker,
            punishment_remind,
        }
    }

    /// The command surface to register with the platform before `start`:
    /// static commands, the roster-derived claim command, and the onboarding
    /// checklist command.
    pub async fn commands(&self) -> Vec<Value> {
        let league = self.ctx.league.lock().await;
        let mut all = commands::default_commands();
        all.push(commands::claim_command(&league.team_claim_choices()));
        all.push(commands::onboard_command());
        all
    }

    /// Start the triggers. Separate from construction so external setup
    /// (command registration) can finish first. The onboarding ticker only
    /// runs while the league is predraft.
    pub async fn start(&mut self) {
        let ctx = Arc::clone(&self.ctx);
        self.new_week.start(move || {
            let ctx = Arc::clone(&ctx);
            async move { ctx.tick().await }
        });

        let predraft = self.ctx.league.lock().await.phase() == Phase::PreDraft;
        if predraft {
            tracing::info!("In predraft: starting onboarding ticker");
            self.ctx.onboarding_active.store(true, Ordering::SeqCst);
            let ctx = Arc::clone(&self.ctx);
            self.onboarding.start(move || {
                let ctx = Arc::clone(&ctx);
                async move {
                    let tracker = ctx.onboarding.lock().await;
                    tracker.remind(ctx.channel.as_ref()).await
                }
            });
        }

        let ctx = Arc::clone(&self.ctx);
        self.punishment_picker.start(move || {
            let ctx = Arc::clone(&ctx);
            async move {
                let mut tracker = ctx.punishments.lock().await;
                tracker.pick(ctx.channel.as_ref()).await
            }
        });

        let ctx = Arc::clone(&self.ctx);
        self.punishment_remind.start(move || {
            let ctx = Arc::clone(&ctx);
            async move {
                let tracker = ctx.punishments.lock().await;
                tracker.remind(ctx.channel.as_ref()).await
            }
        });
    }

    /// Run one new-week tick now. The ticker calls this on schedule; tests
    /// and operators can call it directly.
    pub async fn tick(&self) -> Result<()> {
        self.ctx.tick().await
    }

    pub fn league(&self) -> Arc<Mutex<League>> {
        Arc::clone(&self.ctx.league)
    }

    pub fn onboarding(&self) -> Arc<Mutex<OnboardingTracker>> {
        Arc::clone(&self.ctx.onboarding)
    }

    pub fn punishments(&self) -> Arc<Mutex<PunishmentTracker>> {
        Arc::clone(&self.ctx.punishments)
    }
}

impl TickContext {
    /// One firing of the new-week trigger.
    async fn tick(&self) -> Result<()> {
        let mut league = self.league.lock().await;
        let prev_phase = league.phase();
        league.refresh().await?;

        // The claim command path mutates the owners document outside this
        // process's control flow, so it is re-read every tick.
        let owners = self.read_owners();

        let phase = league.phase();
        match phase {
            Phase::PreDraft => self.handle_predraft(&league).await?,
            Phase::PostDraft => {
                if prev_phase == Phase::PreDraft
                    && self.onboarding_active.swap(false, Ordering::SeqCst)
                {
                    tracing::info!("Draft finished: stopping onboarding ticker");
                    self.onboarding_handle.stop();
                }
                self.handle_new_week(&mut league, &owners).await?;
            }
        }

        tracing::info!("Week {} ({}) tick finished", league.current_week(), phase);
        Ok(())
    }

    async fn handle_predraft(&self, league: &League) -> Result<()> {
        let payload = embeds::draft(league.snapshot(), &self.config.fantasy.league_id);
        let text = format!(
            "**Attention, {}!** It's Tuesday, which means we're starting up another \
             week of fantasy football! This league is currently in **predraft**, so no shotguns \
             are currently due. Get those draft strats finalized and those gullets ready!\n\
             *Use **/claim** to claim a team.*",
            league.name()
        );
        self.channel.send_announcement(&text, Some(&payload)).await
    }

    async fn handle_new_week(
        &self,
        league: &mut League,
        owners: &BTreeMap<String, String>,
    ) -> Result<()> {
        let Some(season_start) = league.season_start() else {
            return Err(CommishError::MissingConfiguration(
                "league has no start date".into(),
            ));
        };

        match new_week_action(season_start, Utc::now()) {
            NewWeekAction::DraftCompleteWaiting => {
                self.channel
                    .send_announcement(
                        "The draft is complete, and gullets are primed for gaping.",
                        None,
                    )
                    .await
            }
            NewWeekAction::SeasonStartsSoon => {
                self.channel
                    .send_announcement(
                        "The season starts this week! Get those teams ready and those guns primed.",
                        None,
                    )
                    .await
            }
            NewWeekAction::AdvanceWeek => match league.advance_week().await? {
                WeekAdvance::AlreadyCurrent => {
                    tracing::info!("Week already advanced on an earlier fire, nothing to announce");
                    Ok(())
                }
                WeekAdvance::Advanced(week) => self.announce_new_week(league, owners, week).await,
            },
        }
    }

    /// The three post-advance announcements: the new week, last week's
    /// losers and their shotgun deadline, and the biggest loser's punishment
    /// deadline.
    async fn announce_new_week(
        &self,
        league: &League,
        owners: &BTreeMap<String, String>,
        week: u32,
    ) -> Result<()> {
        let prev_week = week.saturating_sub(1);
        self.channel
            .send_announcement(&format!("Welcome to **Week {week}**!"), None)
            .await?;

        let members = self.channel.members().await?;

        let loser_mentions: Vec<String> = league
            .previous_week_losers()?
            .iter()
            .filter_map(|team_id| self.member_for_team(owners, &members, team_id))
            .map(|member_id| self.channel.mention(&member_id))
            .collect();
        let shotgun_channel = self
            .channel
            .channel_mention(&self.config.discord.shotgun_channel_id);
        self.channel
            .send_announcement(
                &format!(
                    "The following players lost in their **Week {prev_week}** matchup: {}. \
                     Post a shotgun video to {shotgun_channel} by Sunday at midnight!",
                    loser_mentions.join(" ")
                ),
                None,
            )
            .await?;

        let biggest_team = league.previous_week_biggest_loser()?;
        let biggest = self
            .member_for_team(owners, &members, &biggest_team)
            .map(|member_id| self.channel.mention(&member_id))
            .unwrap_or_else(|| team_display_name(league, &biggest_team));
        let punishments_channel = self
            .channel
            .channel_mention(&self.config.discord.punishments_channel_id);
        self.channel
            .send_announcement(
                &format!(
                    "Nice job, {biggest}! You lost *and* scored the fewest points in \
                     **Week {prev_week}**. You owe us proof of your punishment in \
                     {punishments_channel} by Sunday at midnight!"
                ),
                None,
            )
            .await
    }

    /// Resolve a team to a present guild member through the claim mapping.
    fn member_for_team(
        &self,
        owners: &BTreeMap<String, String>,
        members: &[Member],
        team_id: &str,
    ) -> Option<String> {
        let member_id = owners
            .iter()
            .find(|(_, claimed)| claimed.as_str() == team_id)
            .map(|(member_id, _)| member_id.clone())?;
        members
            .iter()
            .any(|m| m.id == member_id)
            .then_some(member_id)
    }

    fn read_owners(&self) -> BTreeMap<String, String> {
        self.owners
            .read()
            .into_iter()
            .filter_map(|(member_id, team)| {
                team.as_str().map(|t| (member_id, t.to_string()))
            })
            .collect()
    }
}

fn team_display_name(league: &League, team_id: &str) -> String {
    league
        .teams()
        .iter()
        .find(|t| t.team_id == team_id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| team_id.to_string())
}
