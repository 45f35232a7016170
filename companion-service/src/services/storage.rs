//! Audio file storage.

use async_trait::async_trait;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;

#[async_trait]
pub trait AudioStorage: Send + Sync {
    /// Write `data` under `file_name`, returning the full path.
    async fn store(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, AppError>;
}

/// Stores audio files in a local directory.
pub struct LocalAudioStorage {
    base_path: PathBuf,
}

impl LocalAudioStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }
}

#[async_trait]
impl AudioStorage for LocalAudioStorage {
    async fn store(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, AppError> {
        if file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invalid audio file name: {}",
                file_name
            )));
        }

        // The directory may have been removed since startup.
        fs::create_dir_all(&self.base_path).await?;

        let path = self.base_path.join(file_name);
        fs::write(&path, data).await?;
        Ok(path)
    }
}
