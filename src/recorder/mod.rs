//! Recording system module
//!
//! This module implements the record/review/retake flow:
//! - MediaRecorder trait for the encoder that turns a stream into chunks
//! - RecordingController to drive takes, the countdown and finalization
//! - RecordingClip, the artifact a finished take or an upload produces

pub mod channel;
pub mod controller;
pub mod state;

pub use channel::{MediaRecorder, RecordingError, RecordingResult};
pub use controller::{RecordingController, RecordingEvent};
pub use state::{
    ClipData, ClipOrigin, ClipSummary, MediaChunk, RecordingClip, RecordingConfig, RecordingState,
    StopReason,
};
