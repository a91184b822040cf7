//! Deterministic in-process research engine.
//!
//! Mirrors the node layout of the hosted research assistant closely enough
//! for the desk to exercise every screen without an LLM:
//!
//! ```text
//! create_analysts -> [interrupt] human_feedback -> create_analysts   (revise)
//!                                               -> conduct_interview (approve)
//! conduct_interview -> write_report -> done
//! ```

use crate::error::{GraphError, GraphResult};
use crate::ResearchGraph;
use async_trait::async_trait;
use research_types::{Analyst, PausePoint, ResearchState, SessionId, StateSnapshot, StateUpdate};
use std::collections::HashMap;
use tokio::sync::RwLock;

const CREATE_ANALYSTS: &str = "create_analysts";
const CONDUCT_INTERVIEW: &str = "conduct_interview";
const WRITE_REPORT: &str = "write_report";
const APPROVE: &str = "approve";

/// Upper bound on node executions per invoke
const MAX_STEPS: usize = 16;

/// Perspectives the scripted engine draws analysts from
const PERSPECTIVES: &[(&str, &str, &str, &str)] = &[
    (
        "Dr. Maya Chen",
        "Technology Strategist",
        "Institute for Emerging Technology",
        "technical feasibility and the state of the art",
    ),
    (
        "Prof. Liam Okafor",
        "Policy Analyst",
        "Center for Public Policy Research",
        "regulation, standards and public policy",
    ),
    (
        "Sofia Alvarez",
        "Market Economist",
        "Global Markets Observatory",
        "market dynamics, adoption and cost",
    ),
    (
        "Dr. Arjun Mehta",
        "Security Specialist",
        "Cybersecurity Research Lab",
        "threat models and security implications",
    ),
    (
        "Hannah Weiss",
        "Ethics Researcher",
        "Society and Technology Forum",
        "ethical and social consequences",
    ),
    (
        "Kenji Watanabe",
        "Industry Practitioner",
        "Applied Engineering Consortium",
        "deployment experience and operational lessons",
    ),
];

#[derive(Debug, Clone, Default)]
struct ThreadState {
    values: ResearchState,
    next: Vec<String>,
    revision: usize,
}

/// In-memory research graph with one checkpoint per thread
#[derive(Debug, Default)]
pub struct ScriptedGraph {
    threads: RwLock<HashMap<SessionId, ThreadState>>,
}

impl ScriptedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads holding a checkpoint
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[async_trait]
impl ResearchGraph for ScriptedGraph {
    fn kind(&self) -> &'static str {
        "scripted"
    }

    async fn invoke(
        &self,
        thread: &SessionId,
        input: Option<ResearchState>,
    ) -> GraphResult<ResearchState> {
        let mut threads = self.threads.write().await;

        if let Some(input) = input {
            if input.topic.trim().is_empty() {
                return Err(GraphError::InvalidInput("topic must not be empty".to_string()));
            }
            threads.insert(
                thread.clone(),
                ThreadState {
                    values: input,
                    next: vec![CREATE_ANALYSTS.to_string()],
                    revision: 0,
                },
            );
        }

        let state = threads
            .get_mut(thread)
            .filter(|state| !state.next.is_empty())
            .ok_or_else(|| GraphError::NoCheckpoint(thread.to_string()))?;

        run_until_interrupt(state)?;
        Ok(state.values.clone())
    }

    async fn update_state(
        &self,
        thread: &SessionId,
        update: StateUpdate,
        as_node: &str,
    ) -> GraphResult<()> {
        let mut threads = self.threads.write().await;
        let state = threads
            .get_mut(thread)
            .ok_or_else(|| GraphError::NoCheckpoint(thread.to_string()))?;

        if as_node != PausePoint::HUMAN_FEEDBACK {
            return Err(GraphError::InvalidInput(format!(
                "cannot update state as node '{}'",
                as_node
            )));
        }

        state.values.apply(&update);
        state.next = vec![route_feedback(&state.values.human_analyst_feedback).to_string()];
        Ok(())
    }

    async fn get_state(&self, thread: &SessionId) -> GraphResult<StateSnapshot> {
        let threads = self.threads.read().await;
        Ok(threads
            .get(thread)
            .map(|state| StateSnapshot {
                values: state.values.clone(),
                next: state.next.clone(),
            })
            .unwrap_or_default())
    }

    async fn release(&self, thread: &SessionId) -> GraphResult<()> {
        if self.threads.write().await.remove(thread).is_some() {
            tracing::debug!(thread = %thread, "scripted thread released");
        }
        Ok(())
    }
}

/// Execute scheduled nodes until the feedback interrupt or completion
fn run_until_interrupt(state: &mut ThreadState) -> GraphResult<()> {
    for _ in 0..MAX_STEPS {
        let Some(node) = state.next.first().cloned() else {
            return Ok(());
        };

        match node.as_str() {
            CREATE_ANALYSTS => {
                state.values.analysts = create_analysts(&state.values, state.revision);
                state.revision += 1;
                state.next = vec![PausePoint::HUMAN_FEEDBACK.to_string()];
                tracing::debug!(analysts = state.values.analysts.len(), "scripted analysts created");
                return Ok(());
            }
            PausePoint::HUMAN_FEEDBACK => {
                state.next = vec![route_feedback(&state.values.human_analyst_feedback).to_string()];
            }
            CONDUCT_INTERVIEW => {
                state.values.sections = state
                    .values
                    .analysts
                    .iter()
                    .map(|analyst| write_section(&state.values.topic, analyst))
                    .collect();
                state.next = vec![WRITE_REPORT.to_string()];
            }
            WRITE_REPORT => {
                write_report(&mut state.values);
                state.next.clear();
            }
            other => {
                return Err(GraphError::InvalidInput(format!("unknown node '{}'", other)));
            }
        }
    }

    Err(GraphError::InvalidInput(format!(
        "graph did not settle within {} steps",
        MAX_STEPS
    )))
}

fn route_feedback(feedback: &str) -> &'static str {
    if feedback.trim().eq_ignore_ascii_case(APPROVE) {
        CONDUCT_INTERVIEW
    } else {
        CREATE_ANALYSTS
    }
}

fn create_analysts(values: &ResearchState, revision: usize) -> Vec<Analyst> {
    let count = (values.max_analysts as usize).min(PERSPECTIVES.len());
    let feedback = values.human_analyst_feedback.trim();

    PERSPECTIVES
        .iter()
        .cycle()
        .skip(revision % PERSPECTIVES.len())
        .take(count)
        .map(|(name, role, affiliation, focus)| {
            let mut description = format!("Examines {} through the lens of {}.", values.topic, focus);
            if !feedback.is_empty() {
                description.push_str(&format!(" Selected after feedback: \"{}\".", feedback));
            }
            Analyst::new(*name, *role, *affiliation, description)
        })
        .collect()
}

fn write_section(topic: &str, analyst: &Analyst) -> String {
    format!(
        "## {} on {}\n\n{}\n\n### Sources\n[1] Interview with {}, {} ({})",
        analyst.role, topic, analyst.description, analyst.name, analyst.role, analyst.affiliation
    )
}

fn write_report(values: &mut ResearchState) {
    values.introduction = format!(
        "# {}\n\n## Introduction\n\nThis report brings together {} analyst perspectives on {}.",
        values.topic,
        values.analysts.len(),
        values.topic
    );
    values.content = format!("## Insights\n\n{}", values.sections.join("\n\n"));
    values.conclusion = format!(
        "## Conclusion\n\nThe perspectives above outline the open questions and opportunities around {}.",
        values.topic
    );
    values.final_report = [
        values.introduction.as_str(),
        values.content.as_str(),
        values.conclusion.as_str(),
    ]
    .join("\n\n---\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread() -> SessionId {
        SessionId::new("thread-1")
    }

    #[tokio::test]
    async fn test_start_pauses_at_human_feedback() {
        let graph = ScriptedGraph::new();
        let state = graph
            .invoke(&thread(), Some(ResearchState::initial("quantum computing", 3)))
            .await
            .unwrap();

        assert_eq!(state.analysts.len(), 3);
        assert!(state.final_report.is_empty());

        let snapshot = graph.get_state(&thread()).await.unwrap();
        assert!(snapshot.pause_point().unwrap().is_human_feedback());
    }

    #[tokio::test]
    async fn test_analyst_count_is_capped() {
        let graph = ScriptedGraph::new();
        let state = graph
            .invoke(&thread(), Some(ResearchState::initial("fusion", 50)))
            .await
            .unwrap();
        assert_eq!(state.analysts.len(), PERSPECTIVES.len());
    }

    #[tokio::test]
    async fn test_zero_analysts_requested() {
        let graph = ScriptedGraph::new();
        let state = graph
            .invoke(&thread(), Some(ResearchState::initial("fusion", 0)))
            .await
            .unwrap();
        assert!(state.analysts.is_empty());
    }

    #[tokio::test]
    async fn test_empty_topic_rejected() {
        let graph = ScriptedGraph::new();
        let err = graph
            .invoke(&thread(), Some(ResearchState::initial("   ", 3)))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_revision_feedback_regenerates_and_pauses_again() {
        let graph = ScriptedGraph::new();
        let first = graph
            .invoke(&thread(), Some(ResearchState::initial("fusion", 2)))
            .await
            .unwrap();

        graph
            .update_state(
                &thread(),
                StateUpdate::feedback("add a security expert"),
                PausePoint::HUMAN_FEEDBACK,
            )
            .await
            .unwrap();
        let second = graph.invoke(&thread(), None).await.unwrap();

        assert_eq!(second.analysts.len(), 2);
        assert_ne!(first.analysts, second.analysts);
        assert!(second.analysts[0].description.contains("add a security expert"));
        assert!(second.final_report.is_empty());

        let snapshot = graph.get_state(&thread()).await.unwrap();
        assert!(snapshot.pause_point().unwrap().is_human_feedback());
    }

    #[tokio::test]
    async fn test_approve_completes_report() {
        let graph = ScriptedGraph::new();
        graph
            .invoke(&thread(), Some(ResearchState::initial("fusion", 2)))
            .await
            .unwrap();
        graph
            .update_state(&thread(), StateUpdate::feedback(" Approve "), PausePoint::HUMAN_FEEDBACK)
            .await
            .unwrap();
        let done = graph.invoke(&thread(), None).await.unwrap();

        assert_eq!(done.sections.len(), 2);
        assert!(done.final_report.starts_with("# fusion"));
        assert!(done.final_report.contains("\n\n---\n\n## Insights"));
        assert!(done.final_report.ends_with(&done.conclusion));

        let snapshot = graph.get_state(&thread()).await.unwrap();
        assert!(snapshot.is_complete());
    }

    #[tokio::test]
    async fn test_resume_without_checkpoint_fails() {
        let graph = ScriptedGraph::new();
        let err = graph.invoke(&thread(), None).await.unwrap_err();
        assert!(matches!(err, GraphError::NoCheckpoint(_)));

        let err = graph
            .update_state(&thread(), StateUpdate::feedback("approve"), PausePoint::HUMAN_FEEDBACK)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::NoCheckpoint(_)));
    }

    #[tokio::test]
    async fn test_resume_after_completion_fails() {
        let graph = ScriptedGraph::new();
        graph
            .invoke(&thread(), Some(ResearchState::initial("fusion", 1)))
            .await
            .unwrap();
        graph
            .update_state(&thread(), StateUpdate::feedback("approve"), PausePoint::HUMAN_FEEDBACK)
            .await
            .unwrap();
        graph.invoke(&thread(), None).await.unwrap();

        let err = graph.invoke(&thread(), None).await.unwrap_err();
        assert!(matches!(err, GraphError::NoCheckpoint(_)));
    }

    #[tokio::test]
    async fn test_update_as_unknown_node_rejected() {
        let graph = ScriptedGraph::new();
        graph
            .invoke(&thread(), Some(ResearchState::initial("fusion", 1)))
            .await
            .unwrap();
        let err = graph
            .update_state(&thread(), StateUpdate::feedback("approve"), "write_report")
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let graph = ScriptedGraph::new();
        let a = SessionId::new("a");
        let b = SessionId::new("b");
        graph.invoke(&a, Some(ResearchState::initial("fusion", 1))).await.unwrap();
        graph.invoke(&b, Some(ResearchState::initial("batteries", 2))).await.unwrap();

        assert_eq!(graph.thread_count().await, 2);
        assert_eq!(graph.get_state(&a).await.unwrap().values.topic, "fusion");
        assert_eq!(graph.get_state(&b).await.unwrap().values.analysts.len(), 2);
    }

    #[tokio::test]
    async fn test_release_drops_checkpoint() {
        let graph = ScriptedGraph::new();
        graph
            .invoke(&thread(), Some(ResearchState::initial("fusion", 1)))
            .await
            .unwrap();
        assert_eq!(graph.thread_count().await, 1);

        graph.release(&thread()).await.unwrap();
        assert_eq!(graph.thread_count().await, 0);

        let err = graph.invoke(&thread(), None).await.unwrap_err();
        assert!(matches!(err, GraphError::NoCheckpoint(_)));

        // Releasing twice is harmless
        graph.release(&thread()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_thread_has_empty_snapshot() {
        let graph = ScriptedGraph::new();
        let snapshot = graph.get_state(&thread()).await.unwrap();
        assert!(snapshot.pause_point().is_none());
    }
}
