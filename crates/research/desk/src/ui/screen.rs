//! Screens and the control visibility each one produces

use super::render::{self, ERROR_MARKER};
use crate::gateway::{GatewayError, SegmentOutcome};
use research_types::Analyst;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Failures ─────────────────────────────────────────────────────────

/// Every way a research session can end on the error screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchFailure {
    /// Engine failed while starting the research
    Start(String),
    /// Engine failed while processing feedback
    Feedback(String),
    /// Continue pressed without a live session
    NoSession,
    /// Engine paused for feedback without producing analysts
    NoAnalysts,
    /// Engine finished without a report
    NoFinalReport,
}

impl fmt::Display for ResearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchFailure::Start(message) => {
                write!(f, "{} Error starting research: {}", ERROR_MARKER, message)
            }
            ResearchFailure::Feedback(message) => {
                write!(f, "{} Error processing feedback: {}", ERROR_MARKER, message)
            }
            ResearchFailure::NoSession => write!(
                f,
                "{} Error processing feedback: no active research session",
                ERROR_MARKER
            ),
            ResearchFailure::NoAnalysts => write!(
                f,
                "{} No analysts generated. Please try again with a different topic.",
                ERROR_MARKER
            ),
            ResearchFailure::NoFinalReport => {
                write!(f, "{} Error: No final report was generated.", ERROR_MARKER)
            }
        }
    }
}

impl From<GatewayError> for ResearchFailure {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Start(e) => ResearchFailure::Start(e.to_string()),
            GatewayError::Feedback(e) => ResearchFailure::Feedback(e.to_string()),
        }
    }
}

// ── Screens ──────────────────────────────────────────────────────────

/// Discriminant of [`Screen`], for bookkeeping and the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Start,
    AwaitingFeedback,
    Final,
    Error,
}

/// What the page currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Topic entry; nothing running
    Start,
    /// Analysts shown, waiting for approval or revision notes
    AwaitingFeedback {
        topic: String,
        analysts: Vec<Analyst>,
    },
    /// Report shown; only reset remains
    Final { report: String },
    /// Something failed; the user starts over
    Error(ResearchFailure),
}

impl Screen {
    /// Pick the screen for the result of a start or resume.
    ///
    /// A feedback pause with analysts shows them; any other stop shows the
    /// report. Missing analysts or a missing report is an error.
    pub fn after_segment(result: Result<SegmentOutcome, GatewayError>) -> Self {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => return Screen::Error(err.into()),
        };

        if outcome.awaiting_feedback() {
            if outcome.state.analysts.is_empty() {
                return Screen::Error(ResearchFailure::NoAnalysts);
            }
            Screen::AwaitingFeedback {
                topic: outcome.state.topic,
                analysts: outcome.state.analysts,
            }
        } else if outcome.state.final_report.is_empty() {
            Screen::Error(ResearchFailure::NoFinalReport)
        } else {
            Screen::Final {
                report: outcome.state.final_report,
            }
        }
    }

    pub fn kind(&self) -> ScreenKind {
        match self {
            Screen::Start => ScreenKind::Start,
            Screen::AwaitingFeedback { .. } => ScreenKind::AwaitingFeedback,
            Screen::Final { .. } => ScreenKind::Final,
            Screen::Error(_) => ScreenKind::Error,
        }
    }

    pub fn render(&self) -> ScreenView {
        match self {
            Screen::Start => ScreenView {
                screen: ScreenKind::Start,
                output: String::new(),
                feedback: ControlUpdate::hidden().cleared(),
                continue_button: ControlUpdate::hidden(),
                start_button: ControlUpdate::shown(),
                reset_button: ControlUpdate::hidden(),
                topic: ControlUpdate::shown().cleared(),
                max_analysts: ControlUpdate::shown(),
            },
            Screen::AwaitingFeedback { topic, analysts } => ScreenView {
                screen: ScreenKind::AwaitingFeedback,
                output: render::feedback_prompt(topic, analysts),
                feedback: ControlUpdate::shown().cleared(),
                continue_button: ControlUpdate::shown(),
                start_button: ControlUpdate::hidden(),
                reset_button: ControlUpdate::shown(),
                topic: ControlUpdate::shown(),
                max_analysts: ControlUpdate::shown(),
            },
            Screen::Final { report } => ScreenView {
                screen: ScreenKind::Final,
                output: render::final_report(report),
                feedback: ControlUpdate::hidden(),
                continue_button: ControlUpdate::hidden(),
                start_button: ControlUpdate::hidden(),
                reset_button: ControlUpdate::shown(),
                topic: ControlUpdate::shown(),
                max_analysts: ControlUpdate::shown(),
            },
            Screen::Error(failure) => ScreenView {
                screen: ScreenKind::Error,
                output: failure.to_string(),
                feedback: ControlUpdate::hidden().cleared(),
                continue_button: ControlUpdate::hidden(),
                start_button: ControlUpdate::hidden(),
                reset_button: ControlUpdate::shown(),
                topic: ControlUpdate::shown(),
                max_analysts: ControlUpdate::shown(),
            },
        }
    }
}

// ── Rendered view ────────────────────────────────────────────────────

/// Visibility and optional new value for one control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlUpdate {
    pub visible: bool,
    /// Value to write into the control; `None` leaves it untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ControlUpdate {
    pub fn shown() -> Self {
        Self {
            visible: true,
            value: None,
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            value: None,
        }
    }

    pub fn cleared(mut self) -> Self {
        self.value = Some(String::new());
        self
    }
}

/// Everything the page needs to draw one screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenView {
    pub screen: ScreenKind,
    pub output: String,
    pub feedback: ControlUpdate,
    pub continue_button: ControlUpdate,
    pub start_button: ControlUpdate,
    pub reset_button: ControlUpdate,
    pub topic: ControlUpdate,
    pub max_analysts: ControlUpdate,
}
