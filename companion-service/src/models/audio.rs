//! Generated speech files.

use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;

/// URL prefix under which generated audio is served.
pub const AUDIO_URL_PREFIX: &str = "/audio";

/// File extension of every synthesized file.
pub const AUDIO_EXTENSION: &str = "mp3";

/// A synthesized speech file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct AudioArtifact {
    pub audio_id: String,

    /// Location of the written file.
    pub path: PathBuf,

    /// Public URL relative to the service root.
    pub url: String,
}

impl AudioArtifact {
    pub fn new(audio_id: impl Into<String>, path: PathBuf) -> Self {
        let audio_id = audio_id.into();
        let url = format!(
            "{}/{}",
            AUDIO_URL_PREFIX,
            Self::file_name_for(&audio_id)
        );
        Self {
            audio_id,
            path,
            url,
        }
    }

    pub fn file_name_for(audio_id: &str) -> String {
        format!("{}.{}", audio_id, AUDIO_EXTENSION)
    }

    /// Generate a timestamp-derived audio id, e.g. `20250101120000123_1a2b3c4d`.
    ///
    /// The millisecond timestamp keeps ids sortable; the random suffix keeps two
    /// requests in the same millisecond apart.
    pub fn generate_id() -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}_{}", Utc::now().format("%Y%m%d%H%M%S%3f"), &suffix[..8])
    }
}
