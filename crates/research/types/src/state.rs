//! Workflow state as seen from the desk
//!
//! The engine decides which fields it populates after each execution
//! segment, so every field defaults when absent. This keeps partial
//! snapshots from remote engines decodable.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Analyst ──────────────────────────────────────────────────────────

/// An analyst persona produced by the engine
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analyst {
    pub name: String,
    pub role: String,
    pub affiliation: String,
    pub description: String,
}

impl Analyst {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        affiliation: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            affiliation: affiliation.into(),
            description: description.into(),
        }
    }
}

// ── Research State ───────────────────────────────────────────────────

/// Snapshot of the research workflow state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchState {
    /// Topic under research
    pub topic: String,
    /// Upper bound on generated analysts
    pub max_analysts: u32,
    /// Raw feedback text injected at the human feedback pause
    pub human_analyst_feedback: String,
    /// Analysts generated so far, in engine order
    pub analysts: Vec<Analyst>,
    /// Report sections written by the analysts
    pub sections: Vec<String>,
    pub introduction: String,
    pub content: String,
    pub conclusion: String,
    /// Assembled report; empty until the workflow completes
    pub final_report: String,
}

impl ResearchState {
    /// Clean state used to open a new research session
    pub fn initial(topic: impl Into<String>, max_analysts: u32) -> Self {
        Self {
            topic: topic.into(),
            max_analysts,
            ..Default::default()
        }
    }

    pub fn has_analysts(&self) -> bool {
        !self.analysts.is_empty()
    }

    pub fn has_final_report(&self) -> bool {
        !self.final_report.is_empty()
    }

    /// Merge a partial update into this state
    pub fn apply(&mut self, update: &StateUpdate) {
        if let Some(feedback) = &update.human_analyst_feedback {
            self.human_analyst_feedback = feedback.clone();
        }
    }
}

// ── State Update ─────────────────────────────────────────────────────

/// Partial state write injected into a paused execution
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_analyst_feedback: Option<String>,
}

impl StateUpdate {
    pub fn feedback(text: impl Into<String>) -> Self {
        Self {
            human_analyst_feedback: Some(text.into()),
        }
    }
}

// ── Pause Points ─────────────────────────────────────────────────────

/// Named node at which the engine suspends awaiting external input
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PausePoint(String);

impl PausePoint {
    /// Node that waits for analyst feedback
    pub const HUMAN_FEEDBACK: &'static str = "human_feedback";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn human_feedback() -> Self {
        Self(Self::HUMAN_FEEDBACK.to_string())
    }

    pub fn is_human_feedback(&self) -> bool {
        self.0 == Self::HUMAN_FEEDBACK
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PausePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── State Snapshot ───────────────────────────────────────────────────

/// Engine state plus the nodes scheduled to run next
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub values: ResearchState,
    #[serde(default)]
    pub next: Vec<String>,
}

impl StateSnapshot {
    /// First scheduled node, if the execution is suspended
    pub fn pause_point(&self) -> Option<PausePoint> {
        self.next.first().map(|name| PausePoint::new(name.clone()))
    }

    pub fn is_complete(&self) -> bool {
        self.next.is_empty()
    }
}
