//! Workflow configuration
//!
//! Loaded from TOML; every section falls back to its defaults when omitted.

use crate::recorder::RecordingConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration for a wizard host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowConfig {
    pub recording: RecordingConfig,
    pub upload: UploadConfig,
    pub submission: SubmissionConfig,
    pub storage: StorageConfig,
}

/// Limits applied to user-selected files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadConfig {
    /// Largest accepted file, in bytes
    pub max_bytes: u64,

    /// MIME prefixes that may be selected (e.g. `video/`)
    pub accepted_mime_prefixes: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024 * 1024,
            accepted_mime_prefixes: vec!["video/".to_string()],
        }
    }
}

impl UploadConfig {
    pub fn accepts(&self, mime_type: &str) -> bool {
        let mime = mime_type.to_ascii_lowercase();
        self.accepted_mime_prefixes
            .iter()
            .any(|prefix| mime.starts_with(&prefix.to_ascii_lowercase()))
    }
}

/// How the final payload is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionMode {
    /// Fields as a JSON part plus the clip bytes
    Multipart,
    /// Fields and a clip reference URL in one JSON body
    Json,
}

/// Submission endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionConfig {
    /// Endpoint URL
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub mode: SubmissionMode,

    /// Size of each streamed body chunk; progress is reported per chunk
    pub chunk_size: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/api/submissions".to_string(),
            timeout_secs: 60,
            mode: SubmissionMode::Multipart,
            chunk_size: 64 * 1024,
        }
    }
}

impl SubmissionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where drafts are persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Directory for the file-backed store
    pub directory: PathBuf,

    /// Prefix for draft keys
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir().join("capture-wizard"),
            key_prefix: "draft".to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!("Loaded workflow config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = WorkflowConfig::from_toml_str("").unwrap();
        assert_eq!(config.recording.max_duration_secs, 120);
        assert_eq!(config.upload.max_bytes, 100 * 1024 * 1024);
        assert_eq!(config.submission.mode, SubmissionMode::Multipart);
        assert_eq!(config.storage.key_prefix, "draft");
    }

    #[test]
    fn test_partial_sections_override() {
        let config = WorkflowConfig::from_toml_str(
            r#"
            [recording]
            maxDurationSecs = 60

            [submission]
            endpoint = "https://jobs.example.com/api/profiles"
            mode = "json"

            [storage]
            directory = "/var/lib/wizard"
            "#,
        )
        .unwrap();
        assert_eq!(config.recording.max_duration_secs, 60);
        assert_eq!(config.recording.mime_type, "video/webm");
        assert_eq!(config.submission.endpoint, "https://jobs.example.com/api/profiles");
        assert_eq!(config.submission.mode, SubmissionMode::Json);
        assert_eq!(config.submission.timeout_secs, 60);
        assert_eq!(config.storage.directory, PathBuf::from("/var/lib/wizard"));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkflowConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_upload_mime_matching() {
        let upload = UploadConfig::default();
        assert!(upload.accepts("video/mp4"));
        assert!(upload.accepts("Video/QuickTime"));
        assert!(!upload.accepts("image/png"));
    }
}
