//! Preseason onboarding checklist.
//!
//! Two independent checklists: league-wide steps and per-member steps.
//! Steps may complete out of order, but the reminder logic treats the league
//! sequence as ordered: punishments are submitted, then polled, then vetoed.
//! Member payment is independent of the league sequence.

use std::collections::{BTreeMap, BTreeSet};

use commish_channels::{DeliveryChannel, Member};
use commish_core::config::OnboardingConfig;
use commish_core::error::Result;
use commish_store::JsonStore;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// League-wide checklist items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeagueStep {
    PunishmentsSubmitted,
    PunishmentsPolled,
    PunishmentsVetoed,
}

/// Per-member checklist items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemberStep {
    Paid,
    PunishmentsChosen,
    PunishmentVetoed,
}

/// The league-wide nag chosen for a tick. At most one per tick, picked by
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueReminder {
    SubmitPunishments,
    CompletePoll,
    VetoPunishment,
}

/// One member's outstanding duties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberReminder {
    pub member_id: String,
    pub missing: Vec<MemberStep>,
}

/// Everything a reminder tick will send, computed purely from state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlan {
    pub league: Option<LeagueReminder>,
    pub members: Vec<MemberReminder>,
}

/// Tracks checklist completion and persists it through the store.
pub struct OnboardingTracker {
    store: JsonStore,
    config: OnboardingConfig,
    league_steps: BTreeSet<LeagueStep>,
    member_steps: BTreeMap<String, BTreeSet<MemberStep>>,
}

impl OnboardingTracker {
    /// Load tracker state from the backing document. A fresh or corrupt
    /// document starts the checklist empty.
    pub fn load(store: JsonStore, config: OnboardingConfig) -> Self {
        let doc = store.read();
        let league_steps = doc
            .get("leagueSteps")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        let member_steps = doc
            .get("memberSteps")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        Self {
            store,
            config,
            league_steps,
            member_steps,
        }
    }

    /// Mark a league-wide step complete. Idempotent; persists on change.
    pub fn complete_league_step(&mut self, step: LeagueStep) -> Result<()> {
        if self.league_steps.insert(step) {
            self.persist()?;
            tracing::info!("League step {step:?} completed");
        }
        Ok(())
    }

    /// Mark a member's step complete, creating the member's entry on first
    /// use. Idempotent; persists on change.
    pub fn complete_member_step(&mut self, member_id: &str, step: MemberStep) -> Result<()> {
        if self
            .member_steps
            .entry(member_id.to_string())
            .or_default()
            .insert(step)
        {
            self.persist()?;
            tracing::info!("Member {member_id} completed step {step:?}");
        }
        Ok(())
    }

    pub fn league_steps(&self) -> &BTreeSet<LeagueStep> {
        &self.league_steps
    }

    fn member_has(&self, member_id: &str, step: MemberStep) -> bool {
        self.member_steps
            .get(member_id)
            .is_some_and(|steps| steps.contains(&step))
    }

    /// Compute the tick's reminders from current state and membership.
    ///
    /// Pure: the same state and member list always yield the same plan, so
    /// re-running a tick re-sends identical content and nothing else.
    pub fn reminder_plan(&self, members: &[Member]) -> ReminderPlan {
        let humans: Vec<&Member> = members.iter().filter(|m| !m.bot).collect();

        let submitted = self.league_steps.contains(&LeagueStep::PunishmentsSubmitted);
        let polled = self.league_steps.contains(&LeagueStep::PunishmentsPolled);
        let vetoed = self.league_steps.contains(&LeagueStep::PunishmentsVetoed);
        let anyone_unchosen = humans
            .iter()
            .any(|m| !self.member_has(&m.id, MemberStep::PunishmentsChosen));

        let league = if !submitted {
            Some(LeagueReminder::SubmitPunishments)
        } else if !polled && anyone_unchosen {
            Some(LeagueReminder::CompletePoll)
        } else if !vetoed {
            Some(LeagueReminder::VetoPunishment)
        } else {
            None
        };

        let mut member_reminders = Vec::new();
        for member in &humans {
            let mut missing = Vec::new();
            if !self.member_has(&member.id, MemberStep::Paid) {
                missing.push(MemberStep::Paid);
            }
            // Only nag about the poll while it is open to responses.
            if submitted && !polled && !self.member_has(&member.id, MemberStep::PunishmentsChosen)
            {
                missing.push(MemberStep::PunishmentsChosen);
            }
            if !missing.is_empty() {
                member_reminders.push(MemberReminder {
                    member_id: member.id.clone(),
                    missing,
                });
            }
        }

        ReminderPlan {
            league,
            members: member_reminders,
        }
    }

    /// Evaluate the checklist and send reminders. One member's delivery
    /// failure never blocks the others.
    pub async fn remind(&self, channel: &dyn DeliveryChannel) -> Result<()> {
        let members = channel.members().await?;
        let plan = self.reminder_plan(&members);

        if let Some(league) = plan.league {
            if let Err(e) = channel
                .send_announcement(&self.league_text(league), None)
                .await
            {
                tracing::error!("League onboarding reminder failed: {e}");
            }
        }

        for reminder in &plan.members {
            if let Err(e) = channel
                .send_direct(&reminder.member_id, &self.member_text(reminder))
                .await
            {
                tracing::error!(
                    "Onboarding reminder to member {} failed: {e}",
                    reminder.member_id
                );
            }
        }
        Ok(())
    }

    fn league_text(&self, reminder: LeagueReminder) -> String {
        match reminder {
            LeagueReminder::SubmitPunishments => format!(
                "Don't forget to submit your punishments:\n{}",
                self.config.submissions_url
            ),
            LeagueReminder::CompletePoll => format!(
                "Don't forget to complete the punishments poll!\n{}",
                self.config.poll_url
            ),
            LeagueReminder::VetoPunishment => format!(
                "Don't forget to veto a single punishment of your choice:\n{}",
                self.config.vetoes_url
            ),
        }
    }

    fn member_text(&self, reminder: &MemberReminder) -> String {
        let mut text = String::from("Hey gunner, do your duty. You must:");
        if reminder.missing.contains(&MemberStep::Paid) {
            text.push_str(&format!(
                "\n- Pay your buy-in ({}) to the commish.",
                self.config.buy_in
            ));
        }
        if reminder.missing.contains(&MemberStep::PunishmentsChosen) {
            text.push_str("\n- Submit your response to the punishments poll.");
        }
        text
    }

    fn persist(&self) -> Result<()> {
        let mut doc = serde_json::Map::new();
        doc.insert("leagueSteps".into(), json!(self.league_steps));
        doc.insert("memberSteps".into(), json!(self.member_steps));
        self.store.write(&doc)
    }
}
