//! Application state for API handlers

use crate::gateway::WorkflowGateway;
use crate::session::SessionStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Live research sessions
    pub sessions: Arc<SessionStore>,

    /// Path to the research engine
    pub gateway: Arc<WorkflowGateway>,

    /// Desk version
    pub version: String,

    /// Desk start time
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// Human-readable deployment label
    pub environment: String,
}

impl AppState {
    /// Create new application state
    pub fn new(gateway: Arc<WorkflowGateway>, environment: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            gateway,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
            environment: environment.into(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_graph::ScriptedGraph;

    #[test]
    fn test_uptime_formatting() {
        let gateway = Arc::new(WorkflowGateway::new(Arc::new(ScriptedGraph::new())));
        let mut state = AppState::new(gateway, "Development (Local)");

        assert!(state.uptime().ends_with('s'));

        state.started_at = chrono::Utc::now() - chrono::Duration::seconds(125);
        assert_eq!(state.uptime(), "2m 5s");

        state.started_at = chrono::Utc::now() - chrono::Duration::seconds(7260);
        assert_eq!(state.uptime(), "2h 1m");
    }
}
