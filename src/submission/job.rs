use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "reason")]
pub enum JobState {
    Idle,
    InProgress,
    Succeeded,
    Failed(String),
}

/// Record of the attempts to deliver a workflow's payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionJob {
    pub id: Uuid,
    pub state: JobState,
    /// Advisory 0-100, monotonic within an attempt
    pub progress: u8,
    pub attempts: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for SubmissionJob {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionJob {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: JobState::Idle,
            progress: 0,
            attempts: 0,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == JobState::InProgress
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.attempts += 1;
        self.state = JobState::InProgress;
        self.progress = 0;
        self.started_at = Some(Utc::now());
        self.finished_at = None;
    }

    /// Record progress; returns true when the value moved forward
    pub(crate) fn advance_progress(&mut self, percent: u8) -> bool {
        let percent = percent.min(100);
        if !self.is_in_progress() || percent <= self.progress {
            return false;
        }
        self.progress = percent;
        true
    }

    pub(crate) fn succeed(&mut self) {
        self.state = JobState::Succeeded;
        self.progress = 100;
        self.finished_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.state = JobState::Failed(reason.into());
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_never_goes_backwards() {
        let mut job = SubmissionJob::new();
        assert!(!job.advance_progress(10));

        job.begin_attempt();
        assert!(job.advance_progress(30));
        assert!(!job.advance_progress(20));
        assert!(job.advance_progress(90));
        assert_eq!(job.progress, 90);
    }

    #[test]
    fn test_retry_counts_attempts() {
        let mut job = SubmissionJob::new();
        job.begin_attempt();
        job.advance_progress(50);
        job.fail("server error");
        assert_eq!(job.state, JobState::Failed("server error".into()));

        job.begin_attempt();
        assert_eq!(job.attempts, 2);
        assert_eq!(job.progress, 0);
        job.succeed();
        assert_eq!(job.progress, 100);
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(JobState::Failed("timeout".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "failed", "reason": "timeout" }));
    }
}
