//! Conversation session kept in process memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single chat message. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One client's ongoing conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier.
    pub session_id: String,

    /// Rolling history in insertion order, user/assistant pairs.
    pub history: Vec<Message>,

    /// Completed turns since creation; not reduced by trimming.
    pub turn_count: u32,

    /// Audio ids generated for this session.
    pub audio_ids: Vec<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session with a fresh random identifier.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            history: Vec::new(),
            turn_count: 0,
            audio_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append one completed turn.
    pub fn push_turn(&mut self, user: String, assistant: String) {
        self.history.push(Message::user(user));
        self.history.push(Message::assistant(assistant));
        self.turn_count += 1;
        self.updated_at = Utc::now();
    }

    pub fn push_audio(&mut self, audio_id: String) {
        self.audio_ids.push(audio_id);
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
