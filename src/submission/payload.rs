//! Submission payload
//!
//! Normalized draft fields plus a clip reference, built once per attempt.

use crate::draft::{Draft, PostingKind};
use crate::recorder::{ClipSummary, RecordingClip};
use crate::workflow::{SessionContext, WorkflowKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// What gets sent to the submission endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub workflow: WorkflowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posting_kind: Option<PostingKind>,
    pub fields: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipSummary>,

    /// Clip bytes for multipart transfers
    #[serde(skip)]
    pub clip_data: Option<RecordingClip>,

    /// Bearer token for the transfer; never part of the body
    #[serde(skip)]
    pub auth_token: Option<String>,
}

impl SubmissionPayload {
    pub fn build(
        workflow: WorkflowKind,
        draft: &Draft,
        clip: Option<&RecordingClip>,
        context: &SessionContext,
    ) -> Self {
        Self {
            workflow,
            posting_kind: draft.posting_kind(),
            fields: normalize(&draft.to_value()).unwrap_or_else(|| Value::Object(Map::new())),
            submitted_by: context.user_id.clone(),
            submitted_at: Utc::now(),
            clip: clip.map(ClipSummary::from),
            clip_data: clip.cloned(),
            auth_token: context.auth_token.clone(),
        }
    }

    /// The JSON body, without clip bytes or credentials
    pub fn envelope(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Trim strings and drop nulls, recursively. Returns None for null.
fn normalize(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Value::String(s.trim().to_string())),
        Value::Array(items) => Some(Value::Array(items.iter().filter_map(normalize).collect())),
        Value::Object(map) => Some(Value::Object(
            map.iter()
                .filter_map(|(k, v)| normalize(v).map(|v| (k.clone(), v)))
                .collect(),
        )),
        other => Some(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::MediaChunk;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_fields_are_normalized() {
        let draft = Draft::from_value(json!({
            "posting": { "kind": "internship", "title": "  Data Intern ", "salary": null },
            "tags": [" rust ", null, 3]
        }))
        .unwrap();
        let payload = SubmissionPayload::build(
            WorkflowKind::JobPosting,
            &draft,
            None,
            &SessionContext::anonymous(),
        );

        assert_eq!(payload.posting_kind, Some(PostingKind::Internship));
        assert_eq!(
            payload.fields,
            json!({
                "posting": { "kind": "internship", "title": "Data Intern" },
                "tags": ["rust", 3]
            })
        );
    }

    #[test]
    fn test_envelope_hides_credentials_and_bytes() {
        let clip = RecordingClip::from_chunks(
            vec![MediaChunk { sequence: 0, data: vec![1, 2, 3] }],
            "video/webm",
            Duration::from_secs(4),
        );
        let ctx = SessionContext::authenticated("u-9", "tok-123");
        let payload =
            SubmissionPayload::build(WorkflowKind::VideoProfile, &Draft::new(), Some(&clip), &ctx);

        let envelope = payload.envelope();
        assert_eq!(envelope["workflow"], json!("video-profile"));
        assert_eq!(envelope["submittedBy"], json!("u-9"));
        assert_eq!(envelope["clip"]["durationMs"], json!(4000));
        assert_eq!(envelope["clip"]["url"], json!(format!("blob:{}", clip.id)));
        assert!(envelope.get("postingKind").is_none());
        let text = envelope.to_string();
        assert!(!text.contains("tok-123"));
        assert!(payload.clip_data.is_some());
    }
}
