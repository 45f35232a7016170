//! Text-to-speech orchestration: provider call, size check, file write.

use crate::models::AudioArtifact;
use crate::services::metrics;
use crate::services::providers::{ProviderError, SpeechProvider};
use crate::services::storage::AudioStorage;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Synthesized audio too small ({bytes} bytes, minimum {minimum})")]
    AudioTooSmall { bytes: usize, minimum: usize },

    #[error("Failed to store audio: {0}")]
    Storage(#[from] AppError),
}

impl SynthesisError {
    fn outcome(&self) -> &'static str {
        match self {
            SynthesisError::Provider(_) => "provider_error",
            SynthesisError::AudioTooSmall { .. } => "audio_too_small",
            SynthesisError::Storage(_) => "storage_error",
        }
    }
}

#[derive(Clone)]
pub struct SpeechService {
    provider: Arc<dyn SpeechProvider>,
    storage: Arc<dyn AudioStorage>,
    min_audio_bytes: usize,
}

impl SpeechService {
    pub fn new(
        provider: Arc<dyn SpeechProvider>,
        storage: Arc<dyn AudioStorage>,
        min_audio_bytes: usize,
    ) -> Self {
        Self {
            provider,
            storage,
            min_audio_bytes,
        }
    }

    /// Synthesize `text` and write it as `{audio_id}.mp3`.
    ///
    /// Nothing is written unless the provider succeeded and returned at least
    /// the minimum number of bytes.
    pub async fn synthesize(
        &self,
        text: &str,
        audio_id: &str,
    ) -> Result<AudioArtifact, SynthesisError> {
        let preview: String = text.chars().take(30).collect();
        tracing::info!(audio_id = %audio_id, text = %preview, "Starting speech synthesis");

        let result = self.synthesize_inner(text, audio_id).await;

        match &result {
            Ok(artifact) => {
                metrics::record_tts("success");
                tracing::info!(audio_id = %audio_id, path = %artifact.path.display(), "Audio saved");
            }
            Err(e) => {
                metrics::record_tts(e.outcome());
                tracing::error!(audio_id = %audio_id, error = %e, "Speech synthesis failed");
            }
        }

        result
    }

    async fn synthesize_inner(
        &self,
        text: &str,
        audio_id: &str,
    ) -> Result<AudioArtifact, SynthesisError> {
        let audio = self.provider.synthesize(text).await?;
        metrics::record_tts_bytes(audio.len());

        if audio.len() < self.min_audio_bytes {
            return Err(SynthesisError::AudioTooSmall {
                bytes: audio.len(),
                minimum: self.min_audio_bytes,
            });
        }

        let path = self
            .storage
            .store(&AudioArtifact::file_name_for(audio_id), &audio)
            .await?;

        Ok(AudioArtifact::new(audio_id, path))
    }
}
