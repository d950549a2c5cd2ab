//! Error types and handling
//!
//! Crate-wide error type wrapping each component's errors, and the
//! serializable shape handed to the UI layer.

use crate::capture::DeviceError;
use crate::checklist::ChecklistError;
use crate::draft::StoreError;
use crate::media::MediaError;
use crate::playback::PlaybackError;
use crate::recorder::RecordingError;
use crate::submission::SubmissionError;
use crate::workflow::NavigationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workflow-wide error type
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Checklist(#[from] ChecklistError),

    #[error("Draft storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Workflow session is closed")]
    Closed,
}

impl From<DeviceError> for WorkflowError {
    fn from(error: DeviceError) -> Self {
        WorkflowError::Media(error.into())
    }
}

impl From<RecordingError> for WorkflowError {
    fn from(error: RecordingError) -> Self {
        WorkflowError::Media(error.into())
    }
}

impl WorkflowError {
    /// Stable code for the UI layer
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::Media(MediaError::Device(e)) => match e {
                DeviceError::PermissionDenied(_) => "PERMISSION_DENIED",
                DeviceError::DeviceNotFound(_) => "DEVICE_NOT_FOUND",
                DeviceError::DeviceBusy(_) => "DEVICE_BUSY",
                DeviceError::Released => "DEVICE_RELEASED",
            },
            WorkflowError::Media(MediaError::Recording(e)) => match e {
                RecordingError::NoData => "NO_DATA_RECORDED",
                RecordingError::DeviceLost => "DEVICE_LOST",
                _ => "RECORDING_ERROR",
            },
            WorkflowError::Media(MediaError::UnsupportedFile(_)) => "UNSUPPORTED_FILE",
            WorkflowError::Media(MediaError::FileTooLarge { .. }) => "FILE_TOO_LARGE",
            WorkflowError::Media(_) => "MEDIA_ERROR",
            WorkflowError::Playback(_) => "PLAYBACK_ERROR",
            WorkflowError::Checklist(_) => "CHECKLIST_ERROR",
            WorkflowError::Store(_) => "STORAGE_ERROR",
            WorkflowError::Navigation(NavigationError::Validation(_)) => "VALIDATION_ERROR",
            WorkflowError::Navigation(_) => "NAVIGATION_ERROR",
            WorkflowError::Submission(e) => match e {
                SubmissionError::ChecklistIncomplete { .. } => "CHECKLIST_INCOMPLETE",
                SubmissionError::NoMedia => "NO_MEDIA",
                SubmissionError::AlreadyInProgress => "SUBMISSION_IN_PROGRESS",
                SubmissionError::Transfer(t) if t.is_retryable() => "TRANSFER_FAILED",
                SubmissionError::Transfer(_) => "SUBMISSION_REJECTED",
                SubmissionError::Store(_) => "STORAGE_ERROR",
            },
            WorkflowError::Closed => "SESSION_CLOSED",
        }
    }

    /// Whether the same action may succeed if the user tries again
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkflowError::Media(MediaError::Device(e)) => e.is_transient(),
            WorkflowError::Media(MediaError::Recording(RecordingError::DeviceLost)) => true,
            WorkflowError::Submission(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Error response for the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<WorkflowError> for ErrorResponse {
    fn from(error: WorkflowError) -> Self {
        ErrorResponse {
            code: error.code().to_string(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// Result type alias using WorkflowError
pub type WorkflowResult<T> = Result<T, WorkflowError>;
