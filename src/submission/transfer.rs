//! Transfer seam
//!
//! The host's endpoint for finished submissions, plus the status-class
//! error taxonomy every implementation maps into.

use super::payload::SubmissionPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Transfer failures, classified by status class
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// 4xx, or any other non-success status outside 5xx: the endpoint
    /// refused the payload and resending it will not help
    #[error("Submission rejected ({status}): {detail}")]
    ClientError { status: u16, detail: String },

    /// 5xx: transient failure on the endpoint
    #[error("Server error ({status}): {detail}")]
    ServerError { status: u16, detail: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl TransferError {
    /// Map a non-success HTTP status to its class
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if (500..600).contains(&status) {
            TransferError::ServerError { status, detail }
        } else {
            TransferError::ClientError { status, detail }
        }
    }

    /// Whether resending the same payload may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransferError::ServerError { .. } | TransferError::NetworkError(_)
        )
    }
}

/// What the endpoint answered on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub status: u16,
    /// Identifier assigned by the endpoint, if it returned one
    pub reference: Option<String>,
}

/// Receives advisory upload progress (0-100)
#[derive(Clone)]
pub struct ProgressSink(Arc<dyn Fn(u8) + Send + Sync>);

impl ProgressSink {
    pub fn new(f: impl Fn(u8) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A sink that drops every report
    pub fn ignore() -> Self {
        Self::new(|_| {})
    }

    pub fn report(&self, percent: u8) {
        (self.0)(percent.min(100));
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressSink")
    }
}

/// Sends a finished payload to the submission endpoint
#[async_trait]
pub trait Transfer: Send + Sync {
    async fn send(
        &self,
        payload: &SubmissionPayload,
        progress: ProgressSink,
    ) -> Result<TransferReceipt, TransferError>;
}
