//! Session storage.
//!
//! Handlers only see the [`SessionStore`] trait; the in-memory implementation
//! lives for the lifetime of the process and never evicts.

use crate::models::Session;
use crate::services::history::trim_history;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the session for `session_id` if it exists, otherwise create and
    /// store an empty session under a freshly generated id.
    async fn get_or_create(&self, session_id: Option<&str>) -> Session;

    async fn get(&self, session_id: &str) -> Option<Session>;

    /// Append a completed turn, bump the turn count and trim the history to
    /// `max_turns`, as a single step. Returns the updated session. If the
    /// session no longer exists the turn starts a new session under a fresh id.
    async fn record_turn(
        &self,
        session_id: &str,
        user_message: String,
        assistant_reply: String,
        max_turns: usize,
    ) -> Session;

    /// Attach a generated audio id. Returns false if the session is unknown.
    async fn attach_audio(&self, session_id: &str, audio_id: String) -> bool;

    /// Remove a session. Returns false if it did not exist.
    async fn delete(&self, session_id: &str) -> bool;

    async fn list(&self) -> Vec<String>;
}

/// Process-local store backed by a sharded concurrent map.
///
/// Mutations hold the shard lock for their entry, so two chat requests on
/// the same session cannot lose each other's turns.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, session_id: Option<&str>) -> Session {
        if let Some(id) = session_id {
            if let Some(existing) = self.sessions.get(id) {
                return existing.clone();
            }
            tracing::debug!(session_id = %id, "Unknown session id, starting a new session");
        }

        let session = Session::new();
        self.sessions
            .insert(session.session_id.clone(), session.clone());

        tracing::info!(session_id = %session.session_id, "Created session");
        session
    }

    async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    async fn record_turn(
        &self,
        session_id: &str,
        user_message: String,
        assistant_reply: String,
        max_turns: usize,
    ) -> Session {
        if let Some(mut session) = self.sessions.get_mut(session_id) {
            session.push_turn(user_message, assistant_reply);
            let history = std::mem::take(&mut session.history);
            session.history = trim_history(history, max_turns);
            return session.clone();
        }

        // Deleted while the reply was being generated.
        let mut session = Session::new();
        tracing::info!(
            old_session_id = %session_id,
            session_id = %session.session_id,
            "Session removed mid-turn, recording under a new session"
        );
        session.push_turn(user_message, assistant_reply);
        session.history = trim_history(std::mem::take(&mut session.history), max_turns);
        self.sessions
            .insert(session.session_id.clone(), session.clone());
        session
    }

    async fn attach_audio(&self, session_id: &str, audio_id: String) -> bool {
        match self.sessions.get_mut(session_id) {
            Some(mut session) => {
                session.push_audio(audio_id);
                true
            }
            None => false,
        }
    }

    async fn delete(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    async fn list(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}
