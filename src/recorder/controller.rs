//! Recording controller
//!
//! Drives a single take through record → review → (retake | confirm) on top of
//! an open capture stream, with a countdown that stops the take automatically.

use super::channel::{MediaRecorder, RecordingError, RecordingResult};
use super::state::{MediaChunk, RecordingClip, RecordingConfig, RecordingState, StopReason};
use crate::capture::StreamHandle;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Upper bound on how long the recorder may take to flush after `finish`
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Events emitted during recording
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingEvent {
    /// Recording started
    Started,
    /// Recording finished and a clip is ready for review
    Stopped { reason: StopReason, duration_ms: u64 },
    /// In-flight recording was abandoned
    Aborted,
    /// Previous clip discarded
    Retake,
    /// Clip accepted
    Confirmed,
    /// Error occurred
    Error(String),
}

struct Inner {
    state: RecordingState,

    /// Incremented for every take so stale timers and aborted flushes are ignored
    take: u64,

    started_at: Option<Instant>,
    collector: Option<JoinHandle<Vec<MediaChunk>>>,
    timer: Option<JoinHandle<()>>,
    clip: Option<RecordingClip>,
}

struct Shared {
    inner: Mutex<Inner>,
    recorder: Arc<dyn MediaRecorder>,
    config: RecordingConfig,
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        if let Some(collector) = inner.collector.take() {
            collector.abort();
        }
    }
}

/// Record/review/retake state machine
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct RecordingController {
    shared: Arc<Shared>,
}

impl RecordingController {
    pub fn new(recorder: Arc<dyn MediaRecorder>, config: RecordingConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: RecordingState::Idle,
                    take: 0,
                    started_at: None,
                    collector: None,
                    timer: None,
                    clip: None,
                }),
                recorder,
                config,
                event_tx,
            }),
        }
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        self.shared.inner.lock().state
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.shared.event_tx.subscribe()
    }

    pub fn config(&self) -> &RecordingConfig {
        &self.shared.config
    }

    /// Clip under review or confirmed
    pub fn clip(&self) -> Option<RecordingClip> {
        self.shared.inner.lock().clip.clone()
    }

    /// Clip only once it has been confirmed
    pub fn accepted_clip(&self) -> Option<RecordingClip> {
        let inner = self.shared.inner.lock();
        match inner.state {
            RecordingState::Confirmed => inner.clip.clone(),
            _ => None,
        }
    }

    /// Time recorded so far in the current take
    pub fn elapsed(&self) -> Duration {
        let inner = self.shared.inner.lock();
        match (inner.state, inner.started_at) {
            (RecordingState::Recording, Some(started)) => started.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Time left on the countdown
    pub fn remaining(&self) -> Duration {
        self.shared.config.max_duration().saturating_sub(self.elapsed())
    }

    /// Start recording from an open stream
    pub async fn start(&self, stream: &StreamHandle) -> RecordingResult<()> {
        if !stream.is_active() {
            return Err(RecordingError::NotReady);
        }

        let take = {
            let mut inner = self.shared.inner.lock();
            match inner.state {
                RecordingState::Idle => {}
                RecordingState::Recording | RecordingState::Stopping => {
                    return Err(RecordingError::AlreadyRecording)
                }
                RecordingState::Reviewing | RecordingState::Confirmed => {
                    return Err(RecordingError::ClipPending)
                }
            }
            inner.take += 1;
            inner.state = RecordingState::Recording;
            inner.take
        };

        tracing::info!("Starting take {} on stream {}", take, stream.id());

        let mut rx = match self.shared.recorder.start(stream).await {
            Ok(rx) => rx,
            Err(e) => {
                let mut inner = self.shared.inner.lock();
                if inner.take == take {
                    inner.state = RecordingState::Idle;
                }
                drop(inner);
                tracing::error!("Recorder failed to start: {}", e);
                let _ = self.shared.event_tx.send(RecordingEvent::Error(e.to_string()));
                return Err(e);
            }
        };

        let collector = tokio::spawn(async move {
            let mut chunks = Vec::new();
            while let Some(chunk) = rx.recv().await {
                tracing::debug!("Chunk {} ({} bytes)", chunk.sequence, chunk.data.len());
                chunks.push(chunk);
            }
            chunks
        });

        let timer = {
            let weak: Weak<Shared> = Arc::downgrade(&self.shared);
            let limit = self.shared.config.max_duration();
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let controller = RecordingController { shared };
                match controller.finalize(Some(take), StopReason::TimeLimit).await {
                    Ok(Some(_)) => tracing::info!("Take {} stopped at the time limit", take),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Automatic stop of take {} failed: {}", take, e),
                }
            })
        };

        let mut inner = self.shared.inner.lock();
        if inner.take != take || inner.state != RecordingState::Recording {
            // Aborted while the recorder was starting up
            collector.abort();
            timer.abort();
            return Err(RecordingError::NotRecording);
        }
        inner.started_at = Some(Instant::now());
        inner.collector = Some(collector);
        inner.timer = Some(timer);
        drop(inner);

        let _ = self.shared.event_tx.send(RecordingEvent::Started);
        Ok(())
    }

    /// Stop recording
    ///
    /// Only the first stop of a take produces a clip; later calls (including a
    /// countdown that fires at the same moment) return `Ok(None)`.
    pub async fn stop(&self) -> RecordingResult<Option<RecordingClip>> {
        self.finalize(None, StopReason::Manual).await
    }

    async fn finalize(
        &self,
        expected_take: Option<u64>,
        reason: StopReason,
    ) -> RecordingResult<Option<RecordingClip>> {
        let (take, collector, timer, elapsed) = {
            let mut inner = self.shared.inner.lock();
            if expected_take.is_some_and(|t| t != inner.take) {
                return Ok(None);
            }
            match inner.state {
                RecordingState::Recording => {}
                RecordingState::Stopping | RecordingState::Reviewing | RecordingState::Confirmed => {
                    tracing::debug!("Stop ignored ({:?}): take already finalized", reason);
                    return Ok(None);
                }
                RecordingState::Idle => return Err(RecordingError::NotRecording),
            }
            inner.state = RecordingState::Stopping;
            let elapsed = inner.started_at.map(|t| t.elapsed()).unwrap_or_default();
            (inner.take, inner.collector.take(), inner.timer.take(), elapsed)
        };

        if let Some(timer) = timer {
            // The countdown task is the caller on the time-limit path
            if reason != StopReason::TimeLimit {
                timer.abort();
            }
        }

        tracing::info!("Stopping take {} ({:?}) after {:?}", take, reason, elapsed);

        let flushed = match self.shared.recorder.finish().await {
            Ok(()) => match collector {
                Some(collector) => match tokio::time::timeout(FLUSH_TIMEOUT, collector).await {
                    Ok(Ok(chunks)) => Ok(chunks),
                    Ok(Err(e)) => Err(RecordingError::Recorder(format!("chunk collector failed: {e}"))),
                    Err(_) => Err(RecordingError::Recorder("recorder did not flush in time".to_string())),
                },
                None => Ok(Vec::new()),
            },
            Err(e) => {
                if let Some(collector) = collector {
                    collector.abort();
                }
                Err(e)
            }
        };

        let chunks = match flushed {
            Ok(chunks) if !chunks.is_empty() => chunks,
            other => {
                let err = other.err().unwrap_or(RecordingError::NoData);
                let mut inner = self.shared.inner.lock();
                if inner.take == take {
                    inner.state = RecordingState::Idle;
                    inner.started_at = None;
                }
                drop(inner);
                tracing::error!("Take {} produced no clip: {}", take, err);
                let _ = self.shared.event_tx.send(RecordingEvent::Error(err.to_string()));
                return Err(err);
            }
        };

        let duration = elapsed.min(self.shared.config.max_duration());
        let mime_type = self
            .shared
            .recorder
            .mime_type()
            .unwrap_or_else(|| self.shared.config.mime_type.clone());
        let clip = RecordingClip::from_chunks(chunks, &mime_type, duration);

        let mut inner = self.shared.inner.lock();
        if inner.take != take || inner.state != RecordingState::Stopping {
            tracing::debug!("Take {} was abandoned during finalization", take);
            return Ok(None);
        }
        inner.state = RecordingState::Reviewing;
        inner.started_at = None;
        inner.clip = Some(clip.clone());
        drop(inner);

        tracing::info!(
            "Take {} ready for review: {} bytes, {}ms",
            take,
            clip.size_bytes(),
            duration.as_millis()
        );
        let _ = self.shared.event_tx.send(RecordingEvent::Stopped {
            reason,
            duration_ms: duration.as_millis() as u64,
        });
        Ok(Some(clip))
    }

    /// Discard the clip under review and get ready for a new take
    pub fn retake(&self) -> RecordingResult<()> {
        let mut inner = self.shared.inner.lock();
        if inner.state != RecordingState::Reviewing {
            return Err(RecordingError::NotReviewing);
        }
        let discarded = inner.clip.take();
        inner.state = RecordingState::Idle;
        drop(inner);

        if let Some(clip) = discarded {
            tracing::info!("Discarded clip {}", clip.id);
        }
        let _ = self.shared.event_tx.send(RecordingEvent::Retake);
        Ok(())
    }

    /// Accept the clip under review
    pub fn confirm(&self) -> RecordingResult<RecordingClip> {
        let mut inner = self.shared.inner.lock();
        if inner.state != RecordingState::Reviewing {
            return Err(RecordingError::NotReviewing);
        }
        let clip = inner.clip.clone().ok_or(RecordingError::NotReviewing)?;
        inner.state = RecordingState::Confirmed;
        drop(inner);

        tracing::info!("Confirmed clip {}", clip.id);
        let _ = self.shared.event_tx.send(RecordingEvent::Confirmed);
        Ok(clip)
    }

    /// Abandon an in-flight take without producing a clip
    ///
    /// Returns true if a take was interrupted. A clip under review or confirmed
    /// is left alone.
    pub async fn abort(&self) -> bool {
        if !self.interrupt() {
            return false;
        }
        if let Err(e) = self.shared.recorder.finish().await {
            tracing::debug!("Recorder finish after abort: {}", e);
        }
        let _ = self.shared.event_tx.send(RecordingEvent::Aborted);
        true
    }

    /// The capture device went away mid-take
    ///
    /// Forces the controller back to `Idle`. Returns `DeviceLost` if a take
    /// was interrupted so the UI can offer to reconnect.
    pub fn device_lost(&self) -> RecordingResult<()> {
        if self.interrupt() {
            tracing::error!("Capture device lost during recording");
            let _ = self
                .shared
                .event_tx
                .send(RecordingEvent::Error(RecordingError::DeviceLost.to_string()));
            return Err(RecordingError::DeviceLost);
        }
        Ok(())
    }

    /// Abort any take and drop any clip
    pub async fn reset(&self) {
        self.abort().await;
        let mut inner = self.shared.inner.lock();
        inner.clip = None;
        inner.state = RecordingState::Idle;
    }

    fn interrupt(&self) -> bool {
        let mut inner = self.shared.inner.lock();
        if !matches!(inner.state, RecordingState::Recording | RecordingState::Stopping) {
            return false;
        }
        inner.take += 1;
        inner.state = RecordingState::Idle;
        inner.started_at = None;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        if let Some(collector) = inner.collector.take() {
            collector.abort();
        }
        true
    }
}
