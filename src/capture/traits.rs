//! Capture trait definitions
//!
//! Platform-agnostic seams for the camera/microphone device and the file picker.
//! The host (browser shell, desktop webview, test harness) implements these.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while acquiring a capture device
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum DeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device busy: {0}")]
    DeviceBusy(String),

    #[error("Stream already released")]
    Released,
}

impl DeviceError {
    /// Whether retrying the same request can succeed without user action
    pub fn is_transient(&self) -> bool {
        matches!(self, DeviceError::DeviceBusy(_))
    }
}

/// Information about a camera/webcam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,

    /// Supported resolutions
    pub supported_resolutions: Vec<Resolution>,
}

/// Information about an audio device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDeviceInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,

    /// Whether this is the default device
    pub is_default: bool,
}

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// What to ask the device for
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    /// Request a video track
    pub video: bool,

    /// Request an audio track
    pub audio: bool,

    /// Camera device ID (None = default camera)
    pub preferred_camera: Option<String>,

    /// Requested capture resolution
    pub resolution: Resolution,

    /// Requested frame rate
    pub fps: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
            preferred_camera: None,
            resolution: Resolution {
                width: 1280,
                height: 720,
            },
            fps: 30,
        }
    }
}

/// Handle to a live audio/video stream
///
/// Clones share the same activity flag; the hardware indicator is on while
/// `is_active()` returns true.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    id: Uuid,
    label: String,
    has_video: bool,
    has_audio: bool,
    active: Arc<AtomicBool>,
}

impl StreamHandle {
    /// Create an active handle. Called by `CaptureDevice` implementations.
    pub fn new(label: impl Into<String>, has_video: bool, has_audio: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            has_video,
            has_audio,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn has_video(&self) -> bool {
        self.has_video
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Flip the handle to inactive. Returns true only for the first caller.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }
}

/// Camera + microphone provider
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Request a live stream matching the constraints
    async fn acquire(&self, constraints: &CaptureConstraints) -> Result<StreamHandle, DeviceError>;

    /// Release the hardware behind a stream. Called at most once per handle.
    fn release(&self, stream: &StreamHandle);

    /// Enumerate cameras, if the platform allows it
    fn cameras(&self) -> Vec<CameraInfo> {
        Vec::new()
    }

    /// Enumerate microphones, if the platform allows it
    fn microphones(&self) -> Vec<AudioDeviceInfo> {
        Vec::new()
    }
}

/// A file chosen through the host's file picker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedFile {
    /// Location of the file on disk
    pub path: PathBuf,

    /// Display name
    pub name: String,

    /// MIME type reported by the picker
    pub mime_type: String,

    /// File size in bytes
    pub size_bytes: u64,

    /// Duration, when the picker could probe it
    pub duration_ms: Option<u64>,
}

/// External file selection collaborator
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Ask the user for a video file. `Ok(None)` means the dialog was cancelled.
    async fn pick_video(&self) -> std::io::Result<Option<PickedFile>>;
}
