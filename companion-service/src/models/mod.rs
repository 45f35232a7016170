//! Domain models for the companion service.

pub mod audio;
pub mod session;

pub use audio::AudioArtifact;
pub use session::{Message, Role, Session};
