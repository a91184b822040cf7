//! Background expiry of idle research sessions

use crate::config::SessionConfig;
use crate::gateway::WorkflowGateway;
use crate::session::SessionStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Expire sessions idle longer than `max_idle` and release their engine threads.
///
/// Returns the number of sessions expired.
pub async fn sweep_idle_sessions(
    sessions: &SessionStore,
    gateway: &WorkflowGateway,
    max_idle: Duration,
) -> usize {
    let max_idle =
        chrono::Duration::from_std(max_idle).unwrap_or_else(|_| chrono::Duration::weeks(5200));
    let expired = sessions.expire_idle_before(Utc::now() - max_idle).await;

    for id in &expired {
        tracing::info!(session = %id.short(), "idle session expired");
        gateway.release(id).await;
    }
    expired.len()
}

/// Run [`sweep_idle_sessions`] every `sweep_interval` until the task is aborted
pub fn spawn_session_sweeper(
    sessions: Arc<SessionStore>,
    gateway: Arc<WorkflowGateway>,
    config: &SessionConfig,
) -> JoinHandle<()> {
    let idle_timeout = config.idle_timeout();
    let period = config.sweep_interval();

    tokio::spawn(async move {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            let expired = sweep_idle_sessions(&sessions, &gateway, idle_timeout).await;
            if expired > 0 {
                let remaining = sessions.len().await;
                tracing::debug!(expired, remaining, "session sweep finished");
            }
        }
    })
}
