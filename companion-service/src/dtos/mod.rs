//! Request and response bodies of the HTTP API.

pub mod chat;
pub mod health;
pub mod session;
pub mod tts;

pub use chat::{ChatRequest, ChatResponse};
pub use health::{HealthConfig, HealthResponse};
pub use session::{SessionListResponse, StatusResponse};
pub use tts::{TtsRequest, TtsResponse};
