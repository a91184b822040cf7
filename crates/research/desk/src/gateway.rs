//! Workflow gateway: the desk's only path to the research engine.
//!
//! Each operation returns a typed result; nothing the engine raises
//! escapes as a panic or an HTTP error.

use research_graph::{GraphError, GraphResult, ResearchGraph};
use research_types::{PausePoint, ResearchState, SessionId, StateUpdate};
use std::sync::Arc;
use thiserror::Error;

/// State returned by one execution segment, plus where the engine stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentOutcome {
    pub state: ResearchState,
    pub pause_point: Option<PausePoint>,
}

impl SegmentOutcome {
    /// Engine is suspended waiting for analyst feedback
    pub fn awaiting_feedback(&self) -> bool {
        self.pause_point
            .as_ref()
            .is_some_and(PausePoint::is_human_feedback)
    }
}

/// Gateway failures, split by the operation that failed
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Start(GraphError),
    #[error("{0}")]
    Feedback(GraphError),
}

/// Thin adapter over a [`ResearchGraph`]
#[derive(Clone)]
pub struct WorkflowGateway {
    graph: Arc<dyn ResearchGraph>,
}

impl std::fmt::Debug for WorkflowGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowGateway")
            .field("engine", &self.graph.kind())
            .finish()
    }
}

impl WorkflowGateway {
    pub fn new(graph: Arc<dyn ResearchGraph>) -> Self {
        Self { graph }
    }

    pub fn engine_kind(&self) -> &'static str {
        self.graph.kind()
    }

    /// Open the session's thread with a clean state and run to the first pause
    pub async fn start(
        &self,
        session: &SessionId,
        topic: &str,
        max_analysts: u32,
    ) -> Result<SegmentOutcome, GatewayError> {
        tracing::info!(session = %session.short(), topic, max_analysts, "starting research");

        let outcome = async {
            let state = self
                .graph
                .invoke(session, Some(ResearchState::initial(topic, max_analysts)))
                .await?;
            let pause_point = self.current_pause_point(session).await?;
            Ok::<_, GraphError>(SegmentOutcome { state, pause_point })
        }
        .await
        .map_err(GatewayError::Start);

        log_outcome(session, &outcome);
        outcome
    }

    /// Inject feedback at the human feedback pause and resume
    pub async fn submit_feedback(
        &self,
        session: &SessionId,
        feedback: &str,
    ) -> Result<SegmentOutcome, GatewayError> {
        tracing::info!(session = %session.short(), "submitting analyst feedback");

        let outcome = async {
            self.graph
                .update_state(
                    session,
                    StateUpdate::feedback(feedback),
                    PausePoint::HUMAN_FEEDBACK,
                )
                .await?;
            let state = self.graph.invoke(session, None).await?;
            let pause_point = self.current_pause_point(session).await?;
            Ok::<_, GraphError>(SegmentOutcome { state, pause_point })
        }
        .await
        .map_err(GatewayError::Feedback);

        log_outcome(session, &outcome);
        outcome
    }

    /// Drop the session's engine thread. Failures are logged, not returned.
    pub async fn release(&self, session: &SessionId) {
        match self.graph.release(session).await {
            Ok(()) => tracing::debug!(session = %session.short(), "engine thread released"),
            Err(err) => tracing::warn!(
                session = %session.short(),
                error = %err,
                "failed to release engine thread"
            ),
        }
    }

    /// Node the session's thread is suspended before, if any
    pub async fn current_pause_point(&self, session: &SessionId) -> GraphResult<Option<PausePoint>> {
        Ok(self.graph.get_state(session).await?.pause_point())
    }
}

fn log_outcome(session: &SessionId, outcome: &Result<SegmentOutcome, GatewayError>) {
    match outcome {
        Ok(segment) => tracing::info!(
            session = %session.short(),
            pause_point = ?segment.pause_point.as_ref().map(PausePoint::as_str),
            analysts = segment.state.analysts.len(),
            has_report = segment.state.has_final_report(),
            "segment finished"
        ),
        Err(err) => tracing::warn!(session = %session.short(), error = %err, "engine call failed"),
    }
}
