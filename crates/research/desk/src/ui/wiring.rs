//! Event wiring: which controls each page event reads and rewrites

use super::screen::{ControlUpdate, ScreenKind, ScreenView};
use research_types::SessionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// User actions the page can fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiEvent {
    Start,
    Continue,
    Reset,
}

/// Page controls addressable by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Output,
    Topic,
    MaxAnalysts,
    Feedback,
    ContinueButton,
    StartButton,
    ResetButton,
}

/// One event's route plus the controls it reads and writes
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EventBinding {
    pub event: UiEvent,
    pub route: &'static str,
    pub inputs: &'static [Control],
    pub outputs: &'static [Control],
}

/// Every event the page wires up.
///
/// Reset does not list the reset button among its outputs, so the button
/// keeps whatever visibility it had.
pub const BINDINGS: &[EventBinding] = &[
    EventBinding {
        event: UiEvent::Start,
        route: "/api/v1/research/start",
        inputs: &[Control::Topic, Control::MaxAnalysts],
        outputs: &[
            Control::Output,
            Control::Feedback,
            Control::ContinueButton,
            Control::StartButton,
            Control::ResetButton,
        ],
    },
    EventBinding {
        event: UiEvent::Continue,
        route: "/api/v1/research/continue",
        inputs: &[Control::Feedback],
        outputs: &[
            Control::Output,
            Control::Feedback,
            Control::ContinueButton,
            Control::StartButton,
            Control::ResetButton,
        ],
    },
    EventBinding {
        event: UiEvent::Reset,
        route: "/api/v1/research/reset",
        inputs: &[],
        outputs: &[
            Control::Output,
            Control::Topic,
            Control::MaxAnalysts,
            Control::Feedback,
            Control::ContinueButton,
            Control::StartButton,
        ],
    },
];

impl UiEvent {
    pub fn binding(self) -> &'static EventBinding {
        match self {
            UiEvent::Start => &BINDINGS[0],
            UiEvent::Continue => &BINDINGS[1],
            UiEvent::Reset => &BINDINGS[2],
        }
    }
}

/// Response body for every page event
#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub event: UiEvent,
    /// Session the page should send with its next event; `None` after reset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub screen: ScreenKind,
    /// Markdown for the output panel, when the event rewrites it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub controls: BTreeMap<Control, ControlUpdate>,
}

impl EventResponse {
    /// Project a rendered screen onto the controls the event may touch
    pub fn project(event: UiEvent, session_id: Option<SessionId>, view: ScreenView) -> Self {
        let binding = event.binding();
        let mut output = None;
        let mut controls = BTreeMap::new();

        for control in binding.outputs {
            let update = match control {
                Control::Output => {
                    output = Some(view.output.clone());
                    continue;
                }
                Control::Topic => view.topic.clone(),
                Control::MaxAnalysts => view.max_analysts.clone(),
                Control::Feedback => view.feedback.clone(),
                Control::ContinueButton => view.continue_button.clone(),
                Control::StartButton => view.start_button.clone(),
                Control::ResetButton => view.reset_button.clone(),
            };
            controls.insert(*control, update);
        }

        Self {
            event,
            session_id,
            screen: view.screen,
            output,
            controls,
        }
    }
}
