//! Submission pipeline
//!
//! Checks the preconditions, builds the payload, and hands it to the
//! transfer. The draft is cleared only once the endpoint confirms success;
//! a failed attempt leaves the draft and clip exactly as they were.

use super::job::{JobState, SubmissionJob};
use super::payload::SubmissionPayload;
use super::transfer::{ProgressSink, Transfer, TransferError, TransferReceipt};
use crate::checklist::Checklist;
use crate::draft::{DraftStore, StoreError};
use crate::recorder::RecordingClip;
use crate::workflow::{SessionContext, WorkflowKind};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Checklist incomplete: {}", missing.join(", "))]
    ChecklistIncomplete { missing: Vec<String> },

    #[error("No accepted recording or upload to submit")]
    NoMedia,

    #[error("A submission is already in progress")]
    AlreadyInProgress,

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Draft storage error: {0}")]
    Store(#[from] StoreError),
}

impl SubmissionError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmissionError::Transfer(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Submission lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SubmissionEvent {
    Started { job_id: Uuid, attempt: u32 },
    Progress { job_id: Uuid, percent: u8 },
    Succeeded { job_id: Uuid, reference: Option<String> },
    Failed { job_id: Uuid, reason: String, retryable: bool },
}

/// Outcome of a successful submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub job_id: Uuid,
    pub attempts: u32,
    pub receipt: TransferReceipt,
}

/// Everything `submit` reads or clears
pub struct SubmissionRequest<'a> {
    pub kind: WorkflowKind,
    pub drafts: &'a mut DraftStore,
    pub checklist: &'a Checklist,
    pub clip: Option<&'a RecordingClip>,
    pub context: &'a SessionContext,
}

pub struct SubmissionPipeline {
    transfer: Arc<dyn Transfer>,
    job: Arc<Mutex<SubmissionJob>>,
    event_tx: broadcast::Sender<SubmissionEvent>,
}

impl SubmissionPipeline {
    pub fn new(transfer: Arc<dyn Transfer>) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            transfer,
            job: Arc::new(Mutex::new(SubmissionJob::new())),
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionEvent> {
        self.event_tx.subscribe()
    }

    /// Snapshot of the current job
    pub fn job(&self) -> SubmissionJob {
        self.job.lock().clone()
    }

    /// Check preconditions without sending anything
    pub fn ready(
        kind: WorkflowKind,
        checklist: &Checklist,
        clip: Option<&RecordingClip>,
    ) -> Result<(), SubmissionError> {
        if !checklist.is_satisfied() {
            return Err(SubmissionError::ChecklistIncomplete {
                missing: checklist.missing_required(),
            });
        }
        if kind.requires_media() && clip.is_none() {
            return Err(SubmissionError::NoMedia);
        }
        Ok(())
    }

    pub async fn submit(
        &self,
        request: SubmissionRequest<'_>,
    ) -> Result<SubmissionReport, SubmissionError> {
        if self.job.lock().is_in_progress() {
            return Err(SubmissionError::AlreadyInProgress);
        }
        if let Err(e) = Self::ready(request.kind, request.checklist, request.clip) {
            tracing::warn!("Submission refused: {}", e);
            return Err(e);
        }

        let payload = SubmissionPayload::build(
            request.kind,
            request.drafts.draft(),
            request.clip,
            request.context,
        );

        let (job_id, attempt) = {
            let mut job = self.job.lock();
            job.begin_attempt();
            (job.id, job.attempts)
        };
        tracing::info!(
            "Submitting {} (job {}, attempt {})",
            request.kind.slug(),
            job_id,
            attempt
        );
        let _ = self.event_tx.send(SubmissionEvent::Started { job_id, attempt });
        let mut in_flight = InFlight {
            job: self.job.clone(),
            event_tx: self.event_tx.clone(),
            job_id,
            settled: false,
        };

        let progress = {
            let job = self.job.clone();
            let tx = self.event_tx.clone();
            ProgressSink::new(move |percent| {
                if job.lock().advance_progress(percent) {
                    tracing::debug!("Submission progress: {}%", percent);
                    let _ = tx.send(SubmissionEvent::Progress { job_id, percent });
                }
            })
        };

        let result = self.transfer.send(&payload, progress).await;
        in_flight.settled = true;

        match result {
            Ok(receipt) => {
                self.job.lock().succeed();
                if let Err(e) = request.drafts.clear() {
                    // The endpoint has the data; resubmitting would duplicate it
                    tracing::error!("Submitted but failed to clear saved draft: {}", e);
                }
                tracing::info!("Submission {} succeeded ({})", job_id, receipt.status);
                let _ = self.event_tx.send(SubmissionEvent::Succeeded {
                    job_id,
                    reference: receipt.reference.clone(),
                });
                Ok(SubmissionReport {
                    job_id,
                    attempts: attempt,
                    receipt,
                })
            }
            Err(e) => {
                self.job.lock().fail(e.to_string());
                tracing::error!("Submission {} failed: {}", job_id, e);
                let _ = self.event_tx.send(SubmissionEvent::Failed {
                    job_id,
                    reason: e.to_string(),
                    retryable: e.is_retryable(),
                });
                Err(e.into())
            }
        }
    }

    pub fn state(&self) -> JobState {
        self.job.lock().state.clone()
    }

    /// Start a fresh job record; refused while an attempt is in flight
    pub fn reset(&self) -> bool {
        let mut job = self.job.lock();
        if job.is_in_progress() {
            return false;
        }
        *job = SubmissionJob::new();
        true
    }
}

/// Marks the job failed if the attempt future is dropped before the transfer returns
struct InFlight {
    job: Arc<Mutex<SubmissionJob>>,
    event_tx: broadcast::Sender<SubmissionEvent>,
    job_id: Uuid,
    settled: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.job.lock().fail("cancelled");
        tracing::warn!("Submission {} cancelled before the transfer finished", self.job_id);
        let _ = self.event_tx.send(SubmissionEvent::Failed {
            job_id: self.job_id,
            reason: "cancelled".to_string(),
            retryable: true,
        });
    }
}
