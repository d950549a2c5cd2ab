//! Recorder channel
//!
//! The encoder seam that turns a live stream into ordered media chunks.

use super::state::MediaChunk;
use crate::capture::StreamHandle;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Recording errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    #[error("No open capture stream")]
    NotReady,

    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("No clip to review")]
    NotReviewing,

    #[error("A clip is awaiting review; retake it first")]
    ClipPending,

    #[error("Recording produced no data")]
    NoData,

    #[error("Capture device lost during recording")]
    DeviceLost,

    #[error("Recorder error: {0}")]
    Recorder(String),
}

pub type RecordingResult<T> = Result<T, RecordingError>;

/// Encodes a live stream into chunks
///
/// After `finish` the recorder flushes whatever it still buffers and closes the
/// chunk channel; the channel closing is the signal that every chunk has been
/// delivered.
#[async_trait]
pub trait MediaRecorder: Send + Sync {
    /// Start encoding. Chunks arrive on the returned receiver in order.
    async fn start(&self, stream: &StreamHandle) -> RecordingResult<mpsc::UnboundedReceiver<MediaChunk>>;

    /// Request the final flush
    async fn finish(&self) -> RecordingResult<()>;

    /// MIME type of the produced media, when the recorder knows better than the config
    fn mime_type(&self) -> Option<String> {
        None
    }
}
