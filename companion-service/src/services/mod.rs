pub mod history;
pub mod metrics;
pub mod providers;
pub mod session_store;
pub mod speech;
pub mod storage;

pub use history::trim_history;
pub use metrics::{get_metrics, init_metrics};
pub use session_store::{InMemorySessionStore, SessionStore};
pub use speech::{SpeechService, SynthesisError};
pub use storage::{AudioStorage, LocalAudioStorage};
