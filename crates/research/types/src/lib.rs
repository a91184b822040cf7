//! Domain types for Research Desk
//!
//! These types describe the data exchanged with the research workflow
//! engine. The engine owns the schema; this crate only mirrors the fields
//! the desk reads and writes:
//!
//! - [`SessionId`]: correlates one user's interactions with one engine thread
//! - [`ResearchState`]: the workflow state snapshot returned by the engine
//! - [`Analyst`]: an analyst persona generated by the engine
//! - [`StateUpdate`]: a partial write injected at a pause point
//! - [`StateSnapshot`] / [`PausePoint`]: where the engine is suspended

#![deny(unsafe_code)]

pub mod session;
pub mod state;

pub use session::SessionId;
pub use state::{Analyst, PausePoint, ResearchState, StateSnapshot, StateUpdate};
