//! Device session
//!
//! Scoped ownership of one live camera/microphone stream. Every successful
//! open is matched by exactly one release, whichever way the owner exits.

use super::traits::{CaptureConstraints, CaptureDevice, DeviceError, StreamHandle};
use std::sync::Arc;
use std::time::Duration;

/// Owns at most one open stream on a capture device
pub struct DeviceSession {
    device: Arc<dyn CaptureDevice>,
    stream: Option<StreamHandle>,
}

impl DeviceSession {
    pub fn new(device: Arc<dyn CaptureDevice>) -> Self {
        Self {
            device,
            stream: None,
        }
    }

    /// Open the camera and microphone
    ///
    /// Returns the existing handle if one is already open. A handle that comes
    /// back without the requested tracks is released before the error is returned.
    pub async fn open(&mut self, constraints: &CaptureConstraints) -> Result<StreamHandle, DeviceError> {
        if let Some(stream) = self.stream.as_ref().filter(|s| s.is_active()) {
            return Ok(stream.clone());
        }
        self.stream = None;

        tracing::info!(
            "Requesting capture device (video={}, audio={})",
            constraints.video,
            constraints.audio
        );

        let stream = match self.device.acquire(constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Capture device unavailable: {}", e);
                return Err(e);
            }
        };

        let missing = if constraints.video && !stream.has_video() {
            Some("video")
        } else if constraints.audio && !stream.has_audio() {
            Some("audio")
        } else {
            None
        };
        if let Some(track) = missing {
            Self::release_stream(self.device.as_ref(), &stream);
            return Err(DeviceError::DeviceNotFound(format!(
                "no {} track on '{}'",
                track,
                stream.label()
            )));
        }

        tracing::info!("Capture stream {} opened on '{}'", stream.id(), stream.label());
        self.stream = Some(stream.clone());
        Ok(stream)
    }

    /// Open, retrying while the device reports itself busy
    pub async fn open_with_retry(
        &mut self,
        constraints: &CaptureConstraints,
        attempts: u32,
        delay: Duration,
    ) -> Result<StreamHandle, DeviceError> {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.open(constraints).await {
                Err(e) if e.is_transient() && attempt < attempts => {
                    tracing::debug!("Device busy, retry {}/{} in {:?}", attempt, attempts, delay);
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Release the stream. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            Self::release_stream(self.device.as_ref(), &stream);
        }
    }

    /// The open stream, if any
    pub fn stream(&self) -> Option<&StreamHandle> {
        self.stream.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    fn release_stream(device: &dyn CaptureDevice, stream: &StreamHandle) {
        if stream.deactivate() {
            device.release(stream);
            tracing::info!("Capture stream {} released", stream.id());
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        if self.stream.is_some() {
            tracing::warn!("Device session dropped with an open stream; releasing");
            self.close();
        }
    }
}
