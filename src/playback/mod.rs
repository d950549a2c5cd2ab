//! Clip playback
//!
//! Play/pause state over a recorded or uploaded clip, plus the mute and
//! fullscreen toggles that sit beside it.

use crate::recorder::RecordingClip;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("No clip attached")]
    NoClip,

    #[error("Already playing")]
    AlreadyPlaying,

    #[error("Not playing")]
    NotPlaying,
}

/// Snapshot for the UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub clip_id: Option<Uuid>,
    pub position_secs: f64,
    pub progress_fraction: f64,
    pub muted: bool,
    pub fullscreen: bool,
}

/// Drives playback of one clip at a time
#[derive(Debug)]
pub struct PlaybackController {
    state: PlaybackState,
    clip: Option<RecordingClip>,
    position_secs: f64,
    duration_secs: f64,
    progress_fraction: f64,
    muted: bool,
    fullscreen: bool,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            clip: None,
            position_secs: 0.0,
            duration_secs: 0.0,
            progress_fraction: 0.0,
            muted: false,
            fullscreen: false,
        }
    }

    /// Attach a clip (or detach with `None`)
    ///
    /// A different clip resets playback to `Stopped` at 0; the same clip is left playing.
    pub fn attach(&mut self, clip: Option<RecordingClip>) {
        let same = match (&self.clip, &clip) {
            (Some(current), Some(next)) => current.id == next.id,
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }
        tracing::debug!(
            "Playback clip changed to {:?}",
            clip.as_ref().map(|c| c.id)
        );
        self.duration_secs = clip.as_ref().map(|c| c.duration.as_secs_f64()).unwrap_or(0.0);
        self.clip = clip;
        self.state = PlaybackState::Stopped;
        self.position_secs = 0.0;
        self.progress_fraction = 0.0;
    }

    pub fn clip(&self) -> Option<&RecordingClip> {
        self.clip.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.clip.is_none() {
            return Err(PlaybackError::NoClip);
        }
        if self.state == PlaybackState::Playing {
            return Err(PlaybackError::AlreadyPlaying);
        }
        self.state = PlaybackState::Playing;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Playing {
            return Err(PlaybackError::NotPlaying);
        }
        self.state = PlaybackState::Paused;
        Ok(())
    }

    /// Stop and rewind
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.position_secs = 0.0;
        self.progress_fraction = 0.0;
    }

    /// The player reached the end of the clip
    pub fn on_ended(&mut self) {
        self.stop();
    }

    /// Jump to a position, clamped to the clip
    pub fn seek(&mut self, seconds: f64) -> Result<(), PlaybackError> {
        if self.clip.is_none() {
            return Err(PlaybackError::NoClip);
        }
        let upper = if self.duration_secs > 0.0 { self.duration_secs } else { f64::MAX };
        let position = if seconds.is_finite() { seconds.clamp(0.0, upper) } else { 0.0 };
        self.on_progress(position, self.duration_secs);
        Ok(())
    }

    /// Time update from the player
    pub fn on_progress(&mut self, current_time: f64, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.duration_secs = duration;
        }
        self.position_secs = if current_time.is_finite() { current_time.max(0.0) } else { 0.0 };
        self.progress_fraction = if self.duration_secs > 0.0 {
            (self.position_secs / self.duration_secs).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn progress_fraction(&self) -> f64 {
        self.progress_fraction
    }

    pub fn position(&self) -> f64 {
        self.position_secs
    }

    /// Flip mute; returns the new value
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn request_fullscreen(&mut self) -> Result<(), PlaybackError> {
        if self.clip.is_none() {
            return Err(PlaybackError::NoClip);
        }
        self.fullscreen = true;
        Ok(())
    }

    pub fn exit_fullscreen(&mut self) {
        self.fullscreen = false;
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            state: self.state,
            clip_id: self.clip.as_ref().map(|c| c.id),
            position_secs: self.position_secs,
            progress_fraction: self.progress_fraction,
            muted: self.muted,
            fullscreen: self.fullscreen,
        }
    }
}
