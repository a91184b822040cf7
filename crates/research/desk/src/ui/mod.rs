//! Page model: screens, markdown rendering and event wiring

pub mod render;
pub mod screen;
pub mod wiring;

pub use render::ERROR_MARKER;
pub use screen::{ControlUpdate, ResearchFailure, Screen, ScreenKind, ScreenView};
pub use wiring::{Control, EventBinding, EventResponse, UiEvent, BINDINGS};
