//! Media source capability
//!
//! Uniform view over where a workflow's clip comes from.

use crate::capture::DeviceError;
use crate::recorder::{RecordingClip, RecordingError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which variant a source is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    LiveCapture,
    FileUpload,
}

/// Media acquisition errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("File selection failed: {0}")]
    Picker(String),

    #[error("No file selected")]
    NothingSelected,

    #[error("Active media source is not {0:?}")]
    WrongVariant(MediaKind),
}

/// Common operations on either media variant
#[async_trait]
pub trait MediaSource: Send + Sync {
    fn kind(&self) -> MediaKind;

    /// Clip available for preview (under review or accepted)
    fn current_clip(&self) -> Option<RecordingClip>;

    /// Clip accepted as the workflow's media artifact
    fn accepted_clip(&self) -> Option<RecordingClip>;

    /// Release hardware and timers; an accepted clip survives
    async fn suspend(&mut self);

    /// Release everything, including any clip
    async fn teardown(&mut self);
}
