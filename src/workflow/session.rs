//! Workflow session
//!
//! One running wizard: its steps, draft, checklist, media and submission.
//! Every exit path (completion, explicit exit, drop) releases the camera.

use super::context::SessionContext;
use super::navigator::{Advance, NavigationError, StepNavigator};
use super::presets::WorkflowKind;
use super::step::{GuardContext, Step, StepKind};
use crate::capture::{CaptureDevice, FilePicker};
use crate::checklist::Checklist;
use crate::config::WorkflowConfig;
use crate::draft::{Draft, DraftStore, DurableStore, PostingKind, StoreError};
use crate::media::{FileUploadSource, LiveCaptureSource, MediaSlot};
use crate::playback::PlaybackController;
use crate::recorder::{MediaRecorder, RecordingClip, RecordingEvent, RecordingState};
use crate::submission::{
    SubmissionError, SubmissionEvent, SubmissionJob, SubmissionPipeline, SubmissionReport,
    SubmissionRequest, Transfer,
};
use crate::utils::error::{WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowPhase {
    Active,
    Submitting,
    Completed,
    Exited,
}

/// Result of `go_next`
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Now on the step with this id
    Moved { step: String, index: usize },
    /// The terminal step submitted successfully
    Submitted(SubmissionReport),
}

/// Host-supplied collaborators for a session
pub struct SessionServices {
    pub store: Arc<dyn DurableStore>,
    pub transfer: Arc<dyn Transfer>,
    pub config: WorkflowConfig,
}

pub struct WorkflowSession {
    id: Uuid,
    kind: WorkflowKind,
    context: SessionContext,
    navigator: StepNavigator,
    drafts: DraftStore,
    checklist: Checklist,
    media: MediaSlot,
    playback: PlaybackController,
    pipeline: SubmissionPipeline,
    config: WorkflowConfig,
    phase: WorkflowPhase,
}

impl WorkflowSession {
    /// Mount a built-in wizard and restore its saved draft
    pub fn start(
        kind: WorkflowKind,
        context: SessionContext,
        services: SessionServices,
    ) -> WorkflowResult<Self> {
        Self::with_steps(kind, kind.steps(), kind.checklist(), context, services)
    }

    /// Mount a wizard with a custom step list and checklist
    pub fn with_steps(
        kind: WorkflowKind,
        steps: Vec<Step>,
        checklist: Checklist,
        context: SessionContext,
        services: SessionServices,
    ) -> WorkflowResult<Self> {
        let navigator = StepNavigator::new(steps)?;
        let key = format!("{}.{}", services.config.storage.key_prefix, kind.slug());
        let mut drafts = DraftStore::new(services.store, key);
        drafts.hydrate()?;

        let session = Self {
            id: Uuid::new_v4(),
            kind,
            context,
            navigator,
            drafts,
            checklist,
            media: MediaSlot::new(),
            playback: PlaybackController::new(),
            pipeline: SubmissionPipeline::new(services.transfer),
            config: services.config,
            phase: WorkflowPhase::Active,
        };
        tracing::info!(
            "Started {} workflow {} (user: {:?})",
            kind.slug(),
            session.id,
            session.context.user_id
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn current_step(&self) -> &Step {
        self.navigator.current()
    }

    pub fn navigator(&self) -> &StepNavigator {
        &self.navigator
    }

    pub fn draft(&self) -> &Draft {
        self.drafts.draft()
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    pub fn media(&self) -> &MediaSlot {
        &self.media
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.playback
    }

    pub fn job(&self) -> SubmissionJob {
        self.pipeline.job()
    }

    pub fn submission_events(&self) -> broadcast::Receiver<SubmissionEvent> {
        self.pipeline.subscribe()
    }

    pub fn recording_events(&self) -> WorkflowResult<broadcast::Receiver<RecordingEvent>> {
        Ok(self.media.live()?.controller().subscribe())
    }

    fn ensure_active(&self) -> WorkflowResult<()> {
        match self.phase {
            WorkflowPhase::Active => Ok(()),
            WorkflowPhase::Submitting => Err(SubmissionError::AlreadyInProgress.into()),
            WorkflowPhase::Completed | WorkflowPhase::Exited => Err(WorkflowError::Closed),
        }
    }

    /// Merge `partial` into the draft and save it
    pub fn update_draft(&mut self, partial: Value) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.drafts.update(partial)?;
        Ok(())
    }

    pub fn set_posting_kind(&mut self, kind: PostingKind) -> WorkflowResult<()> {
        self.update_draft(kind.as_patch())
    }

    pub fn set_checklist_item(&mut self, name: &str, value: bool) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.checklist.set_item(name, value)?;
        Ok(())
    }

    /// Try to leave the current step
    ///
    /// `fields` are the values submitted on a form step. The guard sees them
    /// merged over the draft; they are saved only if the guard passes. On the
    /// last step this submits instead of moving.
    pub async fn go_next(&mut self, fields: Option<Value>) -> WorkflowResult<StepOutcome> {
        self.ensure_active()?;
        let step_kind = self.navigator.current().kind;

        let fields = match fields {
            Some(Value::Object(map)) if step_kind == StepKind::Form => Some(map),
            Some(Value::Object(_)) => {
                tracing::debug!("Ignoring fields submitted on a {:?} step", step_kind);
                None
            }
            Some(_) => return Err(StoreError::NotAnObject.into()),
            None => None,
        };

        if let Some(patch) = &fields {
            let mut preview = self.drafts.draft().clone();
            preview.merge(patch);
            let ctx = GuardContext {
                draft: &preview,
                checklist: &self.checklist,
                media: self.media.source(),
            };
            if let Err(e) = self.navigator.current().check(&ctx) {
                tracing::warn!("Refused to leave step '{}': {}", e.step, e.report);
                return Err(NavigationError::from(e).into());
            }
            self.drafts.update(Value::Object(patch.clone()))?;
        }

        let ctx = GuardContext {
            draft: self.drafts.draft(),
            checklist: &self.checklist,
            media: self.media.source(),
        };
        match self.navigator.advance(&ctx)? {
            Advance::Moved { from, to } => {
                self.on_leave(from, to).await;
                Ok(StepOutcome::Moved {
                    step: self.navigator.current().id.clone(),
                    index: to,
                })
            }
            Advance::Terminal => Ok(StepOutcome::Submitted(self.submit().await?)),
        }
    }

    /// Go one step back; never guarded. Returns false on the first step.
    pub async fn go_back(&mut self) -> WorkflowResult<bool> {
        self.ensure_active()?;
        let from = self.navigator.current_index();
        if !self.navigator.back() {
            return Ok(false);
        }
        self.on_leave(from, self.navigator.current_index()).await;
        Ok(true)
    }

    /// Sidebar navigation to any step already reached
    pub async fn jump_to(&mut self, step_id: &str) -> WorkflowResult<()> {
        self.ensure_active()?;
        let from = self.navigator.current_index();
        let to = self.navigator.jump_to(step_id)?;
        if from != to {
            self.on_leave(from, to).await;
        }
        Ok(())
    }

    async fn on_leave(&mut self, from: usize, to: usize) {
        match self.navigator.kind_at(from) {
            Some(StepKind::Capture) => self.media.suspend().await,
            Some(StepKind::Review) => {
                self.pipeline.reset();
            }
            _ => {}
        }
        match self.navigator.kind_at(to) {
            Some(StepKind::Review) => self.playback.attach(self.media.accepted_clip()),
            Some(StepKind::Capture) => self.playback.attach(self.media.current_clip()),
            _ => {}
        }
    }

    /// Record with the camera, replacing any previous media
    pub async fn use_live_capture(
        &mut self,
        camera: Arc<dyn CaptureDevice>,
        recorder: Arc<dyn MediaRecorder>,
    ) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.playback.attach(None);
        let live = LiveCaptureSource::new(camera, recorder, self.config.recording.clone());
        self.media.use_live(live).await;
        Ok(())
    }

    /// Let the user pick a file, replacing any previous media once one is chosen
    pub async fn use_file_upload(
        &mut self,
        picker: &dyn FilePicker,
    ) -> WorkflowResult<Option<RecordingClip>> {
        self.ensure_active()?;
        let upload = FileUploadSource::select(picker, &self.config.upload).await?;
        self.media.use_upload(upload).await;
        let clip = self.media.accepted_clip();
        self.playback.attach(clip.clone());
        Ok(clip)
    }

    /// State of the live recorder, if live capture is active
    pub fn recording_state(&self) -> Option<RecordingState> {
        self.media.live().ok().map(|live| live.state())
    }

    pub async fn open_camera(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.media.live_mut()?.open_camera().await?;
        Ok(())
    }

    pub async fn start_recording(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.playback.attach(None);
        self.media.live_mut()?.start_recording().await?;
        Ok(())
    }

    /// Stop the take and load the clip into the player
    pub async fn stop_recording(&mut self) -> WorkflowResult<Option<RecordingClip>> {
        self.ensure_active()?;
        let clip = self.media.live_mut()?.stop_recording().await?;
        if clip.is_some() {
            self.playback.attach(clip.clone());
        } else {
            // A timer stop may have produced the clip already
            self.playback.attach(self.media.current_clip());
        }
        Ok(clip)
    }

    pub fn retake(&mut self) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.media.live_mut()?.retake()?;
        self.playback.attach(None);
        Ok(())
    }

    pub fn confirm_recording(&mut self) -> WorkflowResult<RecordingClip> {
        self.ensure_active()?;
        Ok(self.media.live_mut()?.confirm()?)
    }

    /// The platform reported the camera gone mid-session
    pub fn device_lost(&mut self) -> WorkflowResult<()> {
        self.media.live_mut()?.device_lost()?;
        Ok(())
    }

    /// Submit the draft and accepted clip
    ///
    /// On success the draft is cleared, media is released and the session
    /// completes. On failure nothing is lost and `submit` may be called again.
    pub async fn submit(&mut self) -> WorkflowResult<SubmissionReport> {
        if self.phase == WorkflowPhase::Completed {
            // Nothing new to send: report what is missing, else refuse
            let clip = self.media.accepted_clip();
            SubmissionPipeline::ready(self.kind, &self.checklist, clip.as_ref())?;
            return Err(WorkflowError::Closed);
        }
        self.ensure_active()?;

        let clip = self.media.accepted_clip();
        let result = {
            let _submitting = SubmittingPhase::enter(&mut self.phase);
            self.pipeline
                .submit(SubmissionRequest {
                    kind: self.kind,
                    drafts: &mut self.drafts,
                    checklist: &self.checklist,
                    clip: clip.as_ref(),
                    context: &self.context,
                })
                .await
        };

        match result {
            Ok(report) => {
                self.release().await;
                self.phase = WorkflowPhase::Completed;
                tracing::info!("Workflow {} completed", self.id);
                Ok(report)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Abandon the wizard; the saved draft stays for next time
    pub async fn exit(&mut self) {
        if matches!(self.phase, WorkflowPhase::Exited) {
            return;
        }
        self.release().await;
        self.phase = WorkflowPhase::Exited;
        tracing::info!("Exited workflow {}", self.id);
    }

    /// Abandon the wizard and delete its saved draft
    pub async fn discard(&mut self) -> WorkflowResult<()> {
        self.drafts.discard()?;
        self.exit().await;
        Ok(())
    }

    async fn release(&mut self) {
        self.media.clear().await;
        self.playback.attach(None);
        self.context.clear();
    }
}

/// Holds the session in `Submitting` and puts it back to `Active` when
/// dropped, including when the submit future is cancelled mid-transfer
struct SubmittingPhase<'a> {
    phase: &'a mut WorkflowPhase,
}

impl<'a> SubmittingPhase<'a> {
    fn enter(phase: &'a mut WorkflowPhase) -> Self {
        *phase = WorkflowPhase::Submitting;
        Self { phase }
    }
}

impl Drop for SubmittingPhase<'_> {
    fn drop(&mut self) {
        *self.phase = WorkflowPhase::Active;
    }
}
