//! Live capture source
//!
//! Camera stream plus recorder, exposed as a media source.

use super::source::{MediaError, MediaKind, MediaSource};
use crate::capture::{CaptureConstraints, CaptureDevice, DeviceSession, StreamHandle};
use crate::recorder::{
    MediaRecorder, RecordingClip, RecordingConfig, RecordingController, RecordingState,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Records the clip with the user's camera
pub struct LiveCaptureSource {
    device: DeviceSession,
    controller: RecordingController,
    constraints: CaptureConstraints,
}

impl LiveCaptureSource {
    pub fn new(
        device: Arc<dyn CaptureDevice>,
        recorder: Arc<dyn MediaRecorder>,
        config: RecordingConfig,
    ) -> Self {
        Self {
            device: DeviceSession::new(device),
            controller: RecordingController::new(recorder, config),
            constraints: CaptureConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: CaptureConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Open the camera for preview. Reuses an already open stream.
    pub async fn open_camera(&mut self) -> Result<StreamHandle, MediaError> {
        Ok(self.device.open(&self.constraints).await?)
    }

    pub fn is_camera_open(&self) -> bool {
        self.device.is_open()
    }

    pub fn controller(&self) -> &RecordingController {
        &self.controller
    }

    pub fn state(&self) -> RecordingState {
        self.controller.state()
    }

    /// Start a take, opening the camera first if it is closed
    pub async fn start_recording(&mut self) -> Result<(), MediaError> {
        let stream = self.open_camera().await?;
        self.controller.start(&stream).await?;
        Ok(())
    }

    pub async fn stop_recording(&self) -> Result<Option<RecordingClip>, MediaError> {
        Ok(self.controller.stop().await?)
    }

    /// Throw the reviewed clip away; the camera is released until the next take
    pub fn retake(&mut self) -> Result<(), MediaError> {
        self.controller.retake()?;
        self.device.close();
        Ok(())
    }

    pub fn confirm(&self) -> Result<RecordingClip, MediaError> {
        Ok(self.controller.confirm()?)
    }

    /// The platform reported the camera gone
    pub fn device_lost(&mut self) -> Result<(), MediaError> {
        let result = self.controller.device_lost();
        self.device.close();
        Ok(result?)
    }
}

#[async_trait]
impl MediaSource for LiveCaptureSource {
    fn kind(&self) -> MediaKind {
        MediaKind::LiveCapture
    }

    fn current_clip(&self) -> Option<RecordingClip> {
        self.controller.clip()
    }

    fn accepted_clip(&self) -> Option<RecordingClip> {
        self.controller.accepted_clip()
    }

    async fn suspend(&mut self) {
        if self.controller.abort().await {
            tracing::info!("Abandoned in-flight take while leaving capture");
        }
        self.device.close();
    }

    async fn teardown(&mut self) {
        self.controller.reset().await;
        self.device.close();
    }
}
