//! HTTP handlers for the companion service.

pub mod chat;
mod extract;
pub mod health;
pub mod sessions;
pub mod tts;

pub use chat::chat;
pub use extract::JsonBody;
pub use health::{health_check, metrics_endpoint, readiness_check, root};
pub use sessions::{delete_session, list_sessions};
pub use tts::generate_tts;
