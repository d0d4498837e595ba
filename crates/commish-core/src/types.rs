//! Domain types shared between the league provider and the orchestrator.

use serde::{Deserialize, Serialize};

/// Coarse league lifecycle stage, as reported by the fantasy data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "predraft")]
    PreDraft,
    #[serde(rename = "postdraft")]
    PostDraft,
}

impl Phase {
    /// Parse the wire value from league settings. Anything that is not
    /// "predraft" counts as post-draft; the source also reports values like
    /// "postdraft" and "inseason" once the draft has run.
    pub fn from_wire(s: &str) -> Self {
        if s.eq_ignore_ascii_case("predraft") {
            Phase::PreDraft
        } else {
            Phase::PostDraft
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::PreDraft => write!(f, "predraft"),
            Phase::PostDraft => write!(f, "postdraft"),
        }
    }
}

/// Outcome of a week-advance attempt.
///
/// The guard against double-firing triggers is an expected outcome, not an
/// error: callers log `AlreadyCurrent` and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekAdvance {
    /// The remote source reported a strictly greater week; the cache now
    /// holds the new week number.
    Advanced(u32),
    /// The remote source still reports the cached week. Nothing changed.
    AlreadyCurrent,
}
