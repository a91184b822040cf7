//! Server setup and lifecycle management

use crate::api::{create_router, AppState};
use crate::config::{DeskConfig, EngineConfig};
use crate::error::{DeskError, DeskResult};
use crate::gateway::WorkflowGateway;
use crate::sweeper::spawn_session_sweeper;
use research_graph::{RemoteGraph, RemoteGraphConfig, ResearchGraph, ScriptedGraph};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Research desk server
pub struct Server {
    config: DeskConfig,
    gateway: Arc<WorkflowGateway>,
    environment: String,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DeskConfig, environment: impl Into<String>) -> DeskResult<Self> {
        let graph = build_graph(&config.engine)?;
        let gateway = Arc::new(WorkflowGateway::new(graph));

        Ok(Self {
            config,
            gateway,
            environment: environment.into(),
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DeskResult<()> {
        let addr = self.config.server.listen_addr;

        let listener = TcpListener::bind(addr).await?;

        let state = AppState::new(self.gateway.clone(), self.environment);
        let sweeper = spawn_session_sweeper(
            state.sessions.clone(),
            self.gateway.clone(),
            &self.config.sessions,
        );
        let app = create_router(state, &self.config.server);

        tracing::info!("Research desk listening on {}", addr);
        tracing::info!("Research engine: {}", self.gateway.engine_kind());
        tracing::info!(
            "Idle sessions expire after {}s",
            self.config.sessions.idle_timeout_secs
        );

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DeskError::Server(e.to_string()));

        tracing::info!("Research desk shutting down");
        sweeper.abort();
        served
    }
}

/// Build the engine adapter named by the configuration
pub fn build_graph(engine: &EngineConfig) -> DeskResult<Arc<dyn ResearchGraph>> {
    match engine {
        EngineConfig::Scripted => Ok(Arc::new(ScriptedGraph::new())),
        EngineConfig::Remote {
            url,
            assistant_id,
            api_key,
            timeout_secs,
        } => {
            let mut remote = RemoteGraphConfig::new(url.clone(), assistant_id.clone())
                .with_timeout(Duration::from_secs(*timeout_secs));
            if let Some(key) = api_key {
                remote = remote.with_api_key(key.clone());
            }
            Ok(Arc::new(RemoteGraph::new(remote)?))
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!("Failed to install terminate handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_engine_by_default() {
        let graph = build_graph(&EngineConfig::default()).unwrap();
        assert_eq!(graph.kind(), "scripted");
    }

    #[test]
    fn test_remote_engine_from_config() {
        let engine = EngineConfig::remote("http://127.0.0.1:2024", "research_assistant");
        let graph = build_graph(&engine).unwrap();
        assert_eq!(graph.kind(), "remote");
    }

    #[test]
    fn test_remote_engine_requires_url() {
        let engine = EngineConfig::remote("", "research_assistant");
        let err = build_graph(&engine).err().unwrap();
        assert!(matches!(err, DeskError::Engine(_)));
    }
}
