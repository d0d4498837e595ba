//! Punishment rotation for weekly losers.
//!
//! The tracked state is small: each candidate punishment is a record with an
//! "is an option this cycle" flag and a "was picked" flag. The selection
//! policy is still a product decision; until it lands, `pick` offers the
//! lowest-id unpicked options (count from config) so repeated runs are
//! deterministic, and `remind` nags while anything picked is outstanding.

use std::collections::BTreeMap;

use commish_channels::DeliveryChannel;
use commish_core::config::PunishmentConfig;
use commish_core::error::Result;
use commish_store::JsonStore;
use serde::{Deserialize, Serialize};

/// One punishment candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Punishment {
    pub id: u32,
    /// Eligible to be offered this cycle.
    pub option: bool,
    /// Already offered/chosen in a previous cycle.
    pub picked: bool,
}

/// Tracks the punishment rotation and persists it through the store.
pub struct PunishmentTracker {
    store: JsonStore,
    config: PunishmentConfig,
    punishments: BTreeMap<u32, Punishment>,
}

impl PunishmentTracker {
    /// Load tracker state from the backing document.
    pub fn load(store: JsonStore, config: PunishmentConfig) -> Self {
        let doc = store.read();
        let mut punishments = BTreeMap::new();
        for (key, value) in doc {
            match serde_json::from_value::<Punishment>(value) {
                Ok(p) => {
                    punishments.insert(p.id, p);
                }
                Err(e) => {
                    tracing::error!("Skipping malformed punishment record '{key}': {e}");
                }
            }
        }
        Self {
            store,
            config,
            punishments,
        }
    }

    pub fn records(&self) -> &BTreeMap<u32, Punishment> {
        &self.punishments
    }

    /// Select this cycle's punishment options for the biggest loser and
    /// mark them picked. Deterministic: lowest ids first.
    pub async fn pick(&mut self, channel: &dyn DeliveryChannel) -> Result<()> {
        let chosen: Vec<u32> = self
            .punishments
            .values()
            .filter(|p| p.option && !p.picked)
            .take(self.config.picks_per_cycle)
            .map(|p| p.id)
            .collect();

        if chosen.is_empty() {
            tracing::info!("No unpicked punishment options left, nothing to offer");
            return Ok(());
        }

        for id in &chosen {
            if let Some(p) = self.punishments.get_mut(id) {
                p.picked = true;
            }
        }
        self.persist()?;
        tracing::info!("🎯 Picked punishment options {chosen:?}");

        channel
            .send_announcement(
                &format!(
                    "This week's biggest loser gets a choice of {} punishments. The commish will be in touch. Choose wisely.",
                    chosen.len()
                ),
                None,
            )
            .await?;
        Ok(())
    }

    /// Nag the channel while picked punishments are outstanding.
    pub async fn remind(&self, channel: &dyn DeliveryChannel) -> Result<()> {
        let outstanding = self.punishments.values().filter(|p| p.picked).count();
        if outstanding == 0 {
            tracing::debug!("No outstanding punishments to nag about");
            return Ok(());
        }
        channel
            .send_announcement(
                "Reminder: there are outstanding punishments. Losers, post your proof before the deadline.",
                None,
            )
            .await?;
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let mut doc = serde_json::Map::new();
        for (id, punishment) in &self.punishments {
            let value = serde_json::to_value(punishment)
                .map_err(|e| commish_core::CommishError::Storage(format!("serialize failed: {e}")))?;
            doc.insert(id.to_string(), value);
        }
        self.store.write(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordingChannel;
    use std::path::PathBuf;

    fn tracker_with(name: &str, records: &[(u32, bool, bool)]) -> (PunishmentTracker, PathBuf) {
        let dir = std::env::temp_dir().join(format!("commish-punish-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        let store = JsonStore::open(&dir, "punishments.json").unwrap();
        for (id, option, picked) in records {
            store
                .add(
                    &id.to_string(),
                    serde_json::to_value(Punishment {
                        id: *id,
                        option: *option,
                        picked: *picked,
                    })
                    .unwrap(),
                )
                .unwrap();
        }
        let store = JsonStore::open(&dir, "punishments.json").unwrap();
        (
            PunishmentTracker::load(store, PunishmentConfig::default()),
            dir,
        )
    }

    #[tokio::test]
    async fn pick_takes_lowest_unpicked_options() {
        let (mut tracker, dir) = tracker_with(
            "pick",
            &[(3, true, false), (1, true, false), (2, true, true), (4, true, false)],
        );
        let channel = RecordingChannel::with_members(vec![]);

        tracker.pick(&channel).await.unwrap();

        // picks_per_cycle defaults to 2: ids 1 and 3 (2 was already picked).
        assert!(tracker.records()[&1].picked);
        assert!(tracker.records()[&3].picked);
        assert!(!tracker.records()[&4].picked);
        assert_eq!(channel.announcements().len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn pick_persists_and_is_deterministic_across_reloads() {
        let (mut tracker, dir) = tracker_with("persist", &[(1, true, false), (2, true, false), (3, true, false)]);
        let channel = RecordingChannel::with_members(vec![]);
        tracker.pick(&channel).await.unwrap();

        let store = JsonStore::open(&dir, "punishments.json").unwrap();
        let mut reloaded = PunishmentTracker::load(store, PunishmentConfig::default());
        assert!(reloaded.records()[&1].picked);
        assert!(reloaded.records()[&2].picked);
        assert!(!reloaded.records()[&3].picked);

        // Next cycle continues from where the last one stopped.
        reloaded.pick(&channel).await.unwrap();
        assert!(reloaded.records()[&3].picked);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn pick_with_nothing_left_stays_quiet() {
        let (mut tracker, dir) = tracker_with("empty", &[(1, true, true)]);
        let channel = RecordingChannel::with_members(vec![]);
        tracker.pick(&channel).await.unwrap();
        assert!(channel.announcements().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn remind_only_when_outstanding() {
        let (tracker, dir) = tracker_with("remind", &[(1, true, false)]);
        let channel = RecordingChannel::with_members(vec![]);
        tracker.remind(&channel).await.unwrap();
        assert!(channel.announcements().is_empty());
        std::fs::remove_dir_all(&dir).ok();

        let (tracker, dir) = tracker_with("remind2", &[(1, true, true)]);
        tracker.remind(&channel).await.unwrap();
        assert_eq!(channel.announcements().len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
