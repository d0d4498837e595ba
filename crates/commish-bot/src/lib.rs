//! # Commish Bot
//! The season-state orchestration core.
//!
//! [`commissioner::Commissioner`] owns the recurring triggers and composes
//! the trackers: the [`onboarding::OnboardingTracker`] preseason checklist
//! and the [`punishments::PunishmentTracker`] rotation. Everything user
//! facing is derived from current state plus the tick time; re-running a
//! tick with unchanged state produces the same messages.

pub mod commissioner;
pub mod embeds;
pub mod onboarding;
pub mod punishments;

#[cfg(test)]
pub(crate) mod testutil;

pub use commissioner::Commissioner;
pub use onboarding::{LeagueStep, MemberStep, OnboardingTracker};
pub use punishments::PunishmentTracker;
