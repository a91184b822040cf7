//! Research workflow engine boundary
//!
//! The research workflow (analyst generation, feedback routing,
//! interviews, report assembly) runs inside an engine the desk does not
//! own. The desk reaches it only through [`ResearchGraph`], a resumable
//! computation keyed by a thread identifier:
//!
//! - [`ResearchGraph::invoke`]: start with an input, or resume with none
//! - [`ResearchGraph::update_state`]: inject values as if a node produced them
//! - [`ResearchGraph::get_state`]: read the state and the next scheduled nodes
//! - [`ResearchGraph::release`]: drop the thread and its checkpoint
//!
//! Two adapters are provided:
//!
//! - [`RemoteGraph`]: talks to a hosted graph server over its thread API
//! - [`ScriptedGraph`]: deterministic in-process engine for local runs and tests

#![deny(unsafe_code)]

pub mod error;
pub mod remote;
pub mod scripted;

pub use error::{GraphError, GraphResult};
pub use remote::{RemoteGraph, RemoteGraphConfig};
pub use scripted::ScriptedGraph;

use async_trait::async_trait;
use research_types::{ResearchState, SessionId, StateSnapshot, StateUpdate};

/// A compiled research workflow that can be run, paused and resumed
#[async_trait]
pub trait ResearchGraph: Send + Sync {
    /// Short engine name for logs and health output
    fn kind(&self) -> &'static str;

    /// Run the thread until it pauses or completes.
    ///
    /// `Some(input)` starts the thread from a clean state; `None` resumes
    /// from the last checkpoint.
    async fn invoke(
        &self,
        thread: &SessionId,
        input: Option<ResearchState>,
    ) -> GraphResult<ResearchState>;

    /// Write `update` into the thread as if `as_node` had produced it
    async fn update_state(
        &self,
        thread: &SessionId,
        update: StateUpdate,
        as_node: &str,
    ) -> GraphResult<()>;

    /// Current state and scheduled nodes for the thread
    async fn get_state(&self, thread: &SessionId) -> GraphResult<StateSnapshot>;

    /// Discard the thread's checkpoint. Releasing an unknown thread is not an error.
    async fn release(&self, thread: &SessionId) -> GraphResult<()>;
}
