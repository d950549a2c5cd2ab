//! File upload source
//!
//! A video the user picked from disk instead of recording one.

use super::source::{MediaError, MediaKind, MediaSource};
use crate::capture::{FilePicker, PickedFile};
use crate::config::UploadConfig;
use crate::recorder::RecordingClip;
use async_trait::async_trait;
use std::time::Duration;

/// Uses a selected file as the workflow's clip
///
/// Selecting a file accepts it; there is no separate review step.
pub struct FileUploadSource {
    file: PickedFile,
    clip: Option<RecordingClip>,
}

impl FileUploadSource {
    /// Validate a picked file and wrap it
    pub fn from_file(file: PickedFile, limits: &UploadConfig) -> Result<Self, MediaError> {
        if !limits.accepts(&file.mime_type) {
            return Err(MediaError::UnsupportedFile(file.mime_type.clone()));
        }
        if file.size_bytes > limits.max_bytes {
            return Err(MediaError::FileTooLarge {
                size: file.size_bytes,
                limit: limits.max_bytes,
            });
        }

        let duration = Duration::from_millis(file.duration_ms.unwrap_or(0));
        let clip = RecordingClip::from_file(&file.path, &file.mime_type, file.size_bytes, duration);
        tracing::info!("Selected upload '{}' ({} bytes)", file.name, file.size_bytes);

        Ok(Self {
            file,
            clip: Some(clip),
        })
    }

    /// Ask the picker for a file
    pub async fn select(picker: &dyn FilePicker, limits: &UploadConfig) -> Result<Self, MediaError> {
        let picked = picker
            .pick_video()
            .await
            .map_err(|e| MediaError::Picker(e.to_string()))?
            .ok_or(MediaError::NothingSelected)?;
        Self::from_file(picked, limits)
    }

    pub fn file(&self) -> &PickedFile {
        &self.file
    }
}

#[async_trait]
impl MediaSource for FileUploadSource {
    fn kind(&self) -> MediaKind {
        MediaKind::FileUpload
    }

    fn current_clip(&self) -> Option<RecordingClip> {
        self.clip.clone()
    }

    fn accepted_clip(&self) -> Option<RecordingClip> {
        self.clip.clone()
    }

    async fn suspend(&mut self) {}

    async fn teardown(&mut self) {
        if let Some(clip) = self.clip.take() {
            tracing::debug!("Dropped upload clip {}", clip.id);
        }
    }
}
