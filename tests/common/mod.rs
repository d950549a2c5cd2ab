//! Host-side fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use capture_wizard::capture::{
    CaptureConstraints, CaptureDevice, DeviceError, FilePicker, PickedFile, StreamHandle,
};
use capture_wizard::draft::MemoryStore;
use capture_wizard::recorder::{MediaChunk, MediaRecorder, RecordingResult};
use capture_wizard::submission::{
    ProgressSink, SubmissionPayload, Transfer, TransferError, TransferReceipt,
};
use capture_wizard::{SessionContext, SessionServices, WorkflowConfig, WorkflowKind, WorkflowSession};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct Webcam {
    granted: AtomicU32,
    released: AtomicU32,
}

impl Webcam {
    pub fn open_streams(&self) -> u32 {
        self.granted.load(Ordering::SeqCst) - self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureDevice for Webcam {
    async fn acquire(&self, constraints: &CaptureConstraints) -> Result<StreamHandle, DeviceError> {
        self.granted.fetch_add(1, Ordering::SeqCst);
        Ok(StreamHandle::new("Integrated Webcam", constraints.video, constraints.audio))
    }

    fn release(&self, _stream: &StreamHandle) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Recorder the test drives by pushing chunks
#[derive(Default)]
pub struct Encoder {
    tx: Mutex<Option<mpsc::UnboundedSender<MediaChunk>>>,
    sequence: AtomicU64,
}

impl Encoder {
    pub fn push(&self, data: &[u8]) {
        if let Some(tx) = self.tx.lock().as_ref() {
            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(MediaChunk { sequence, data: data.to_vec() });
        }
    }
}

#[async_trait]
impl MediaRecorder for Encoder {
    async fn start(&self, _stream: &StreamHandle) -> RecordingResult<mpsc::UnboundedReceiver<MediaChunk>> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.tx.lock() = Some(tx);
        Ok(rx)
    }

    async fn finish(&self) -> RecordingResult<()> {
        self.tx.lock().take();
        Ok(())
    }
}

pub struct Picker(pub Option<PickedFile>);

#[async_trait]
impl FilePicker for Picker {
    async fn pick_video(&self) -> std::io::Result<Option<PickedFile>> {
        Ok(self.0.clone())
    }
}

pub fn picked(path: PathBuf, mime_type: &str, size_bytes: u64) -> PickedFile {
    PickedFile {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path,
        mime_type: mime_type.to_string(),
        size_bytes,
        duration_ms: Some(30_000),
    }
}

/// Transfer that fails with the scripted errors first
#[derive(Default)]
pub struct Endpoint {
    failures: Mutex<VecDeque<TransferError>>,
    received: Mutex<Vec<SubmissionPayload>>,
}

impl Endpoint {
    pub fn failing_with(errors: Vec<TransferError>) -> Self {
        Self {
            failures: Mutex::new(errors.into()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<SubmissionPayload> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl Transfer for Endpoint {
    async fn send(
        &self,
        payload: &SubmissionPayload,
        progress: ProgressSink,
    ) -> Result<TransferReceipt, TransferError> {
        self.received.lock().push(payload.clone());
        progress.report(50);
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        progress.report(100);
        Ok(TransferReceipt {
            status: 201,
            reference: Some("ok".to_string()),
        })
    }
}

pub fn start(
    kind: WorkflowKind,
    store: Arc<MemoryStore>,
    endpoint: Arc<dyn Transfer>,
) -> WorkflowSession {
    WorkflowSession::start(
        kind,
        SessionContext::authenticated("user-1", "token-1").with_redirect("/profile"),
        SessionServices {
            store,
            transfer: endpoint,
            config: WorkflowConfig::default(),
        },
    )
    .expect("session starts")
}
