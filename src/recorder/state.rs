//! Recording state management
//!
//! Defines the record/review/retake state machine and the clip it produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Current state of the recording controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// Ready for a new recording
    Idle,
    /// Currently recording
    Recording,
    /// Stop requested, waiting for the recorder to flush
    Stopping,
    /// A clip is available for review
    Reviewing,
    /// The reviewed clip was accepted
    Confirmed,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Why a recording ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The user pressed stop
    Manual,
    /// The countdown ran out
    TimeLimit,
    /// The recording was abandoned without producing a clip
    Aborted,
}

/// Configuration for recordings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingConfig {
    /// Hard limit on a single take, in seconds
    pub max_duration_secs: u64,

    /// Container/codec the recorder produces
    pub mime_type: String,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 120,
            mime_type: "video/webm".to_string(),
        }
    }
}

impl RecordingConfig {
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }
}

/// One piece of encoded media delivered by the recorder
#[derive(Debug, Clone)]
pub struct MediaChunk {
    /// Arrival sequence number
    pub sequence: u64,
    pub data: Vec<u8>,
}

/// Where a clip came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipOrigin {
    Recorded,
    Uploaded,
}

/// Bytes behind a clip
#[derive(Debug, Clone)]
pub enum ClipData {
    /// Recorded in memory
    Memory(Arc<[u8]>),
    /// A file on disk (uploads)
    File(PathBuf),
}

/// A finished recording or a selected upload
#[derive(Debug, Clone)]
pub struct RecordingClip {
    pub id: Uuid,
    pub data: ClipData,
    pub mime_type: String,
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
    pub origin: ClipOrigin,
    size_bytes: u64,
}

impl RecordingClip {
    /// Build a clip from recorded chunks, preserving their order
    pub fn from_chunks(chunks: Vec<MediaChunk>, mime_type: &str, duration: Duration) -> Self {
        let size: usize = chunks.iter().map(|c| c.data.len()).sum();
        let mut bytes = Vec::with_capacity(size);
        for chunk in chunks {
            bytes.extend_from_slice(&chunk.data);
        }
        Self {
            id: Uuid::new_v4(),
            data: ClipData::Memory(Arc::from(bytes)),
            mime_type: mime_type.to_string(),
            duration,
            created_at: Utc::now(),
            origin: ClipOrigin::Recorded,
            size_bytes: size as u64,
        }
    }

    /// Wrap a file on disk
    pub fn from_file(path: &Path, mime_type: &str, size_bytes: u64, duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            data: ClipData::File(path.to_path_buf()),
            mime_type: mime_type.to_string(),
            duration,
            created_at: Utc::now(),
            origin: ClipOrigin::Uploaded,
            size_bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// URL a player can load this clip from
    pub fn playable_url(&self) -> String {
        match &self.data {
            ClipData::Memory(_) => format!("blob:{}", self.id),
            ClipData::File(path) => {
                let encoded: Vec<String> = path
                    .to_string_lossy()
                    .split('/')
                    .map(|segment| urlencoding::encode(segment).into_owned())
                    .collect();
                let joined = encoded.join("/");
                if joined.starts_with('/') {
                    format!("file://{}", joined)
                } else {
                    format!("file:///{}", joined)
                }
            }
        }
    }

    /// Read the clip's bytes
    pub async fn bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.data {
            ClipData::Memory(bytes) => Ok(bytes.to_vec()),
            ClipData::File(path) => tokio::fs::read(path).await,
        }
    }
}

/// Serializable view of a clip for payloads and the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSummary {
    pub id: Uuid,
    pub url: String,
    pub mime_type: String,
    pub duration_ms: u64,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub origin: ClipOrigin,
}

impl From<&RecordingClip> for ClipSummary {
    fn from(clip: &RecordingClip) -> Self {
        Self {
            id: clip.id,
            url: clip.playable_url(),
            mime_type: clip.mime_type.clone(),
            duration_ms: clip.duration.as_millis() as u64,
            size_bytes: clip.size_bytes,
            created_at: clip.created_at,
            origin: clip.origin,
        }
    }
}
