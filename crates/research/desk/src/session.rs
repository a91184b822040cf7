//! Research session bookkeeping
//!
//! Each browser gets its own [`SessionId`], which is also the engine
//! thread the session's workflow runs on. Starting a new research from the
//! same page retires the page's previous session, and sessions left idle
//! past the configured timeout are expired by the sweeper.

use crate::ui::ScreenKind;
use chrono::{DateTime, Utc};
use research_types::SessionId;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// What the desk remembers about a live session
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub topic: String,
    pub max_analysts: u32,
    /// Screen most recently shown for this session
    pub screen: ScreenKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of [`SessionStore::begin_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedSession {
    pub id: SessionId,
    /// Previous session that was retired to make room, if it was still live
    pub retired: Option<SessionId>,
}

/// Per-session slots, one per live research session
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh session, retiring `previous` if the caller had one
    pub async fn begin_session(
        &self,
        previous: Option<&SessionId>,
        topic: &str,
        max_analysts: u32,
    ) -> OpenedSession {
        let id = SessionId::generate();
        let now = Utc::now();
        let record = SessionRecord {
            id: id.clone(),
            topic: topic.to_string(),
            max_analysts,
            screen: ScreenKind::Start,
            created_at: now,
            updated_at: now,
        };

        let mut sessions = self.sessions.write().await;
        let retired = previous
            .filter(|previous| sessions.remove(*previous).is_some())
            .cloned();
        if let Some(previous) = &retired {
            tracing::debug!(session = %previous.short(), "retired previous session");
        }
        sessions.insert(id.clone(), record);

        OpenedSession { id, retired }
    }

    pub async fn get(&self, id: &SessionId) -> Option<SessionRecord> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Remember the screen last rendered for a session
    pub async fn record_screen(&self, id: &SessionId, screen: ScreenKind) {
        if let Some(record) = self.sessions.write().await.get_mut(id) {
            record.screen = screen;
            record.updated_at = Utc::now();
        }
    }

    /// Drop a session. Returns whether it existed.
    pub async fn end_session(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Remove sessions not touched since `cutoff`, returning their ids
    pub async fn expire_idle_before(&self, cutoff: DateTime<Utc>) -> Vec<SessionId> {
        let mut sessions = self.sessions.write().await;
        let expired: Vec<SessionId> = sessions
            .values()
            .filter(|record| record.updated_at < cutoff)
            .map(|record| record.id.clone())
            .collect();
        for id in &expired {
            sessions.remove(id);
        }
        expired
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_begin_session_creates_slot() {
        let store = SessionStore::new();
        let opened = store.begin_session(None, "fusion", 3).await;
        assert!(opened.retired.is_none());

        let record = store.get(&opened.id).await.unwrap();
        assert_eq!(record.topic, "fusion");
        assert_eq!(record.max_analysts, 3);
        assert_eq!(record.screen, ScreenKind::Start);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_new_session_retires_previous() {
        let store = SessionStore::new();
        let first = store.begin_session(None, "fusion", 3).await.id;
        let second = store.begin_session(Some(&first), "batteries", 2).await;

        assert_eq!(second.retired.as_ref(), Some(&first));
        let second = second.id;
        assert_ne!(first, second);
        assert!(!store.contains(&first).await);
        assert!(store.contains(&second).await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_users_do_not_collide() {
        let store = SessionStore::new();
        let alice = store.begin_session(None, "fusion", 3).await.id;
        let bob = store.begin_session(None, "batteries", 2).await.id;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get(&alice).await.unwrap().topic, "fusion");
        assert_eq!(store.get(&bob).await.unwrap().topic, "batteries");
    }

    #[tokio::test]
    async fn test_record_screen_and_end_session() {
        let store = SessionStore::new();
        let id = store.begin_session(None, "fusion", 3).await.id;

        store.record_screen(&id, ScreenKind::AwaitingFeedback).await;
        assert_eq!(store.get(&id).await.unwrap().screen, ScreenKind::AwaitingFeedback);

        assert!(store.end_session(&id).await);
        assert!(!store.end_session(&id).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_previous_is_not_reported_retired() {
        let store = SessionStore::new();
        let opened = store
            .begin_session(Some(&SessionId::new("gone")), "fusion", 3)
            .await;
        assert!(opened.retired.is_none());
    }

    #[tokio::test]
    async fn test_expire_idle_sessions() {
        let store = SessionStore::new();
        let stale = store.begin_session(None, "fusion", 3).await.id;
        let fresh = store.begin_session(None, "batteries", 2).await.id;

        let past = Utc::now() - chrono::Duration::hours(1);
        assert!(store.expire_idle_before(past).await.is_empty());

        store.sessions.write().await.get_mut(&stale).unwrap().updated_at = past;
        let expired = store
            .expire_idle_before(Utc::now() - chrono::Duration::minutes(30))
            .await;

        assert_eq!(expired, vec![stale.clone()]);
        assert!(!store.contains(&stale).await);
        assert!(store.contains(&fresh).await);
    }
}
