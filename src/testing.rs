//! In-crate fakes for the host-supplied seams

use crate::capture::{
    CaptureConstraints, CaptureDevice, DeviceError, FilePicker, PickedFile, StreamHandle,
};
use crate::recorder::{MediaChunk, MediaRecorder, RecordingError, RecordingResult};
use crate::submission::{ProgressSink, SubmissionPayload, Transfer, TransferError, TransferReceipt};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use tokio::sync::mpsc;

pub fn open_stream() -> StreamHandle {
    StreamHandle::new("Test Camera", true, true)
}

pub struct FakeCamera {
    failure: Option<DeviceError>,
    busy_remaining: AtomicU32,
    has_audio: bool,
    acquired: AtomicU32,
    granted: AtomicU32,
    released: AtomicU32,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self {
            failure: None,
            busy_remaining: AtomicU32::new(0),
            has_audio: true,
            acquired: AtomicU32::new(0),
            granted: AtomicU32::new(0),
            released: AtomicU32::new(0),
        }
    }

    pub fn failing(error: DeviceError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    pub fn busy_for(attempts: u32) -> Self {
        Self {
            busy_remaining: AtomicU32::new(attempts),
            ..Self::new()
        }
    }

    pub fn video_only() -> Self {
        Self {
            has_audio: false,
            ..Self::new()
        }
    }

    /// Every call to `acquire`, successful or not
    pub fn acquire_count(&self) -> u32 {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> u32 {
        self.released.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet released
    pub fn active_streams(&self) -> u32 {
        self.granted
            .load(Ordering::SeqCst)
            .saturating_sub(self.release_count())
    }
}

#[async_trait]
impl CaptureDevice for FakeCamera {
    async fn acquire(&self, constraints: &CaptureConstraints) -> Result<StreamHandle, DeviceError> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let busy = self.busy_remaining.load(Ordering::SeqCst);
        if busy > 0 {
            self.busy_remaining.store(busy - 1, Ordering::SeqCst);
            return Err(DeviceError::DeviceBusy("in use by another app".into()));
        }
        self.granted.fetch_add(1, Ordering::SeqCst);
        Ok(StreamHandle::new(
            "Fake Camera",
            constraints.video,
            constraints.audio && self.has_audio,
        ))
    }

    fn release(&self, _stream: &StreamHandle) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeRecorder {
    tx: Mutex<Option<mpsc::UnboundedSender<MediaChunk>>>,
    tail: Option<Vec<u8>>,
    sequence: AtomicU64,
    finished: AtomicU32,
    fail_start: AtomicBool,
}

impl FakeRecorder {
    pub fn new() -> Self {
        Self {
            tx: Mutex::new(None),
            tail: None,
            sequence: AtomicU64::new(0),
            finished: AtomicU32::new(0),
            fail_start: AtomicBool::new(false),
        }
    }

    /// Emits `tail` as a last chunk when asked to finish
    pub fn with_tail(tail: &[u8]) -> Self {
        Self {
            tail: Some(tail.to_vec()),
            ..Self::new()
        }
    }

    /// Refuses its first `start`, then behaves normally
    pub fn failing_first_start() -> Self {
        Self {
            fail_start: AtomicBool::new(true),
            ..Self::new()
        }
    }

    pub fn push(&self, data: &[u8]) {
        if let Some(tx) = self.tx.lock().as_ref() {
            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(MediaChunk {
                sequence,
                data: data.to_vec(),
            });
        }
    }

    pub fn finish_count(&self) -> u32 {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaRecorder for FakeRecorder {
    async fn start(&self, _stream: &StreamHandle) -> RecordingResult<mpsc::UnboundedReceiver<MediaChunk>> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(RecordingError::Recorder("encoder unavailable".into()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *self.tx.lock() = Some(tx);
        Ok(rx)
    }

    async fn finish(&self) -> RecordingResult<()> {
        self.finished.fetch_add(1, Ordering::SeqCst);
        if let Some(tail) = &self.tail {
            self.push(tail);
        }
        self.tx.lock().take();
        Ok(())
    }
}

pub struct FakePicker {
    file: Option<PickedFile>,
}

impl FakePicker {
    pub fn returning(file: Option<PickedFile>) -> Self {
        Self { file }
    }
}

#[async_trait]
impl FilePicker for FakePicker {
    async fn pick_video(&self) -> std::io::Result<Option<PickedFile>> {
        Ok(self.file.clone())
    }
}

/// Transfer that replays scripted outcomes, then succeeds
pub struct FakeTransfer {
    outcomes: Mutex<VecDeque<Result<(), TransferError>>>,
    sent: Mutex<Vec<SubmissionPayload>>,
    stall_first: AtomicBool,
}

impl FakeTransfer {
    pub fn succeeding() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            stall_first: AtomicBool::new(false),
        }
    }

    /// First send never completes; later sends succeed
    pub fn stalling_once() -> Self {
        Self {
            stall_first: AtomicBool::new(true),
            ..Self::succeeding()
        }
    }

    pub fn failing_then_succeeding(errors: Vec<TransferError>) -> Self {
        Self {
            outcomes: Mutex::new(errors.into_iter().map(Err).collect()),
            sent: Mutex::new(Vec::new()),
            stall_first: AtomicBool::new(false),
        }
    }

    pub fn sent(&self) -> Vec<SubmissionPayload> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transfer for FakeTransfer {
    async fn send(
        &self,
        payload: &SubmissionPayload,
        progress: ProgressSink,
    ) -> Result<TransferReceipt, TransferError> {
        self.sent.lock().push(payload.clone());
        progress.report(25);
        progress.report(75);
        if self.stall_first.swap(false, Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let outcome = self.outcomes.lock().pop_front().unwrap_or(Ok(()));
        outcome.map(|_| TransferReceipt {
            status: 201,
            reference: Some(format!("sub-{}", self.sent.lock().len())),
        })
    }
}
