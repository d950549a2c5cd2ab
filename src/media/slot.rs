//! Active media slot
//!
//! Holds the one media source a workflow session uses. Switching variants
//! tears the old one down before the new one is installed.

use super::live::LiveCaptureSource;
use super::source::{MediaError, MediaKind, MediaSource};
use super::upload::FileUploadSource;
use crate::recorder::RecordingClip;

/// The installed media variant
pub enum ActiveMedia {
    Live(LiveCaptureSource),
    Upload(FileUploadSource),
}

impl ActiveMedia {
    fn source(&self) -> &dyn MediaSource {
        match self {
            ActiveMedia::Live(live) => live,
            ActiveMedia::Upload(upload) => upload,
        }
    }

    fn source_mut(&mut self) -> &mut dyn MediaSource {
        match self {
            ActiveMedia::Live(live) => live,
            ActiveMedia::Upload(upload) => upload,
        }
    }
}

/// At most one active media source
#[derive(Default)]
pub struct MediaSlot {
    active: Option<ActiveMedia>,
}

impl MediaSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a live capture source, tearing down whatever was there
    pub async fn use_live(&mut self, live: LiveCaptureSource) {
        self.clear().await;
        tracing::info!("Media source switched to live capture");
        self.active = Some(ActiveMedia::Live(live));
    }

    /// Install an upload source, tearing down whatever was there
    pub async fn use_upload(&mut self, upload: FileUploadSource) {
        self.clear().await;
        tracing::info!("Media source switched to file upload");
        self.active = Some(ActiveMedia::Upload(upload));
    }

    pub fn kind(&self) -> Option<MediaKind> {
        self.active.as_ref().map(|a| a.source().kind())
    }

    pub fn source(&self) -> Option<&dyn MediaSource> {
        self.active.as_ref().map(|a| a.source())
    }

    pub fn live_mut(&mut self) -> Result<&mut LiveCaptureSource, MediaError> {
        match self.active.as_mut() {
            Some(ActiveMedia::Live(live)) => Ok(live),
            _ => Err(MediaError::WrongVariant(MediaKind::LiveCapture)),
        }
    }

    pub fn live(&self) -> Result<&LiveCaptureSource, MediaError> {
        match self.active.as_ref() {
            Some(ActiveMedia::Live(live)) => Ok(live),
            _ => Err(MediaError::WrongVariant(MediaKind::LiveCapture)),
        }
    }

    pub fn upload(&self) -> Result<&FileUploadSource, MediaError> {
        match self.active.as_ref() {
            Some(ActiveMedia::Upload(upload)) => Ok(upload),
            _ => Err(MediaError::WrongVariant(MediaKind::FileUpload)),
        }
    }

    pub fn current_clip(&self) -> Option<RecordingClip> {
        self.source().and_then(|s| s.current_clip())
    }

    pub fn accepted_clip(&self) -> Option<RecordingClip> {
        self.source().and_then(|s| s.accepted_clip())
    }

    /// Release hardware held by the active source
    pub async fn suspend(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.source_mut().suspend().await;
        }
    }

    /// Tear down and remove the active source
    pub async fn clear(&mut self) {
        if let Some(mut active) = self.active.take() {
            let kind = active.source().kind();
            active.source_mut().teardown().await;
            tracing::debug!("Tore down {:?} media source", kind);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}
