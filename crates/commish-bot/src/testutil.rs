//! Shared test doubles for the tracker and commissioner tests.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use commish_channels::{DeliveryChannel, Member, MessagePayload};
use commish_core::error::{CommishError, Result};
use commish_league::{FantasySource, LeagueMetadata, LeagueSettings, Matchup, Scoreboard, Team};

pub fn member(id: &str, bot: bool) -> Member {
    Member {
        id: id.to_string(),
        display_name: id.to_string(),
        bot,
    }
}

/// Delivery channel that records every send instead of talking to Discord.
pub struct RecordingChannel {
    members: Vec<Member>,
    announcements: Mutex<Vec<String>>,
    directs: Mutex<Vec<(String, String)>>,
    failing_directs: Mutex<BTreeSet<String>>,
}

impl RecordingChannel {
    pub fn with_members(members: Vec<Member>) -> Self {
        Self {
            members,
            announcements: Mutex::new(Vec::new()),
            directs: Mutex::new(Vec::new()),
            failing_directs: Mutex::new(BTreeSet::new()),
        }
    }

    /// Make DMs to one member fail, to prove failures stay isolated.
    pub fn fail_direct_to(&self, member_id: &str) {
        self.failing_directs
            .lock()
            .unwrap()
            .insert(member_id.to_string());
    }

    pub fn announcements(&self) -> Vec<String> {
        self.announcements.lock().unwrap().clone()
    }

    pub fn directs(&self) -> Vec<(String, String)> {
        self.directs.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn send_announcement(&self, text: &str, _payload: Option<&MessagePayload>) -> Result<()> {
        self.announcements.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_direct(&self, member_id: &str, text: &str) -> Result<()> {
        if self.failing_directs.lock().unwrap().contains(member_id) {
            return Err(CommishError::Channel(format!(
                "simulated delivery failure to {member_id}"
            )));
        }
        self.directs
            .lock()
            .unwrap()
            .push((member_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn members(&self) -> Result<Vec<Member>> {
        Ok(self.members.clone())
    }

    fn mention(&self, member_id: &str) -> String {
        format!("<@{member_id}>")
    }

    fn channel_mention(&self, channel_id: &str) -> String {
        format!("<#{channel_id}>")
    }
}

/// Fantasy source with adjustable week, phase and start date. Every week's
/// scoreboard is the same single matchup: team 1 beats team 2, 100 to 50.
pub struct MockSource {
    week: AtomicU32,
    draft_status: Mutex<String>,
    start_date: Mutex<Option<NaiveDate>>,
}

impl MockSource {
    pub fn predraft() -> Self {
        Self {
            week: AtomicU32::new(1),
            draft_status: Mutex::new("predraft".into()),
            start_date: Mutex::new(None),
        }
    }

    pub fn postdraft(week: u32, start_date: NaiveDate) -> Self {
        Self {
            week: AtomicU32::new(week),
            draft_status: Mutex::new("postdraft".into()),
            start_date: Mutex::new(Some(start_date)),
        }
    }

    pub fn set_week(&self, week: u32) {
        self.week.store(week, Ordering::SeqCst);
    }

    pub fn set_postdraft(&self, start_date: NaiveDate) {
        *self.draft_status.lock().unwrap() = "postdraft".into();
        *self.start_date.lock().unwrap() = Some(start_date);
    }
}

#[async_trait]
impl FantasySource for MockSource {
    async fn settings(&self, _key: &str) -> Result<LeagueSettings> {
        Ok(LeagueSettings {
            name: "Gullet Gang".into(),
            draft_status: self.draft_status.lock().unwrap().clone(),
            current_week: self.week.load(Ordering::SeqCst),
            start_date: *self.start_date.lock().unwrap(),
            end_date: None,
        })
    }

    async fn teams(&self, _key: &str) -> Result<Vec<Team>> {
        Ok(vec![
            Team {
                team_id: "1".into(),
                name: "Gridiron Goblins".into(),
                logo_url: String::new(),
                number_of_trades: 0,
                draft_grade: None,
            },
            Team {
                team_id: "2".into(),
                name: "Waiver Wire Warlocks".into(),
                logo_url: String::new(),
                number_of_trades: 1,
                draft_grade: Some("C".into()),
            },
        ])
    }

    async fn scoreboard(&self, _key: &str, week: Option<u32>) -> Result<Scoreboard> {
        Ok(Scoreboard {
            week: week.unwrap_or_else(|| self.week.load(Ordering::SeqCst)),
            matchups: vec![Matchup {
                team_a: "1".into(),
                team_b: "2".into(),
                winner_team_id: "1".into(),
                points_a: 100.0,
                points_b: 50.0,
            }],
        })
    }

    async fn metadata(&self, _key: &str) -> Result<LeagueMetadata> {
        Ok(LeagueMetadata {
            draft_status: self.draft_status.lock().unwrap().clone(),
            current_week: self.week.load(Ordering::SeqCst),
        })
    }
}
