//! HTTP transfer
//!
//! Delivers payloads to the submission endpoint over HTTP. Multipart mode
//! sends a `fields` JSON part and streams the clip as a `video` part,
//! reporting progress per chunk. JSON mode sends the envelope alone, with
//! the clip referenced by URL.

use super::payload::SubmissionPayload;
use super::transfer::{ProgressSink, Transfer, TransferError, TransferReceipt};
use crate::config::{SubmissionConfig, SubmissionMode};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response};
use serde_json::Value;

/// Progress while the body is still streaming never claims completion
const STREAMING_CEILING: u8 = 95;

pub struct HttpTransfer {
    client: Client,
    config: SubmissionConfig,
}

impl HttpTransfer {
    pub fn new(config: SubmissionConfig) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransferError::NetworkError(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    async fn multipart_request(
        &self,
        payload: &SubmissionPayload,
        progress: ProgressSink,
    ) -> Result<RequestBuilder, TransferError> {
        let fields = Part::text(payload.envelope().to_string())
            .mime_str("application/json")
            .map_err(|e| TransferError::InvalidPayload(e.to_string()))?;
        let mut form = Form::new().part("fields", fields);

        if let Some(clip) = &payload.clip_data {
            let bytes = clip
                .bytes()
                .await
                .map_err(|e| TransferError::InvalidPayload(format!("Cannot read clip: {}", e)))?;
            let total = bytes.len() as u64;
            let body = streamed_body(bytes, self.config.chunk_size, progress);
            let part = Part::stream_with_length(body, total)
                .file_name(format!("{}.{}", clip.id, extension_for(&clip.mime_type)))
                .mime_str(&clip.mime_type)
                .map_err(|e| TransferError::InvalidPayload(e.to_string()))?;
            form = form.part("video", part);
        }

        Ok(self.client.post(&self.config.endpoint).multipart(form))
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn send(
        &self,
        payload: &SubmissionPayload,
        progress: ProgressSink,
    ) -> Result<TransferReceipt, TransferError> {
        let mut request = match self.config.mode {
            SubmissionMode::Multipart => self.multipart_request(payload, progress.clone()).await?,
            SubmissionMode::Json => self.client.post(&self.config.endpoint).json(&payload.envelope()),
        };
        if let Some(token) = &payload.auth_token {
            request = request.bearer_auth(token);
        }

        tracing::info!(
            "Sending {} submission to {} ({:?})",
            payload.workflow.slug(),
            self.config.endpoint,
            self.config.mode
        );
        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                TransferError::InvalidPayload(e.to_string())
            } else {
                TransferError::NetworkError(e.to_string())
            }
        })?;

        let receipt = classify(response).await?;
        progress.report(100);
        Ok(receipt)
    }
}

/// Split `bytes` into chunks and report progress as each one is pulled
fn streamed_body(bytes: Vec<u8>, chunk_size: usize, progress: ProgressSink) -> Body {
    let total = bytes.len().max(1);
    let chunks: Vec<Vec<u8>> = bytes
        .chunks(chunk_size.max(1))
        .map(<[u8]>::to_vec)
        .collect();
    let mut sent = 0usize;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len();
        let percent = (sent * STREAMING_CEILING as usize / total) as u8;
        tracing::debug!("Streamed {} of {} clip bytes", sent, total);
        progress.report(percent);
        Ok::<_, std::io::Error>(chunk)
    });
    Body::wrap_stream(stream)
}

async fn classify(response: Response) -> Result<TransferReceipt, TransferError> {
    let status = response.status();
    if status.is_success() {
        let body: Option<Value> = response.json().await.ok();
        let reference = body.as_ref().and_then(|b| {
            b.get("id")
                .or_else(|| b.get("reference"))
                .and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
        });
        return Ok(TransferReceipt {
            status: status.as_u16(),
            reference,
        });
    }

    let detail = response.text().await.unwrap_or_default();
    let error = TransferError::from_status(status.as_u16(), detail);
    tracing::warn!("Submission endpoint answered {}: {}", status, error);
    Err(error)
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type.split(';').next().unwrap_or_default().trim() {
        "video/webm" => "webm",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Draft;
    use crate::recorder::{MediaChunk, RecordingClip};
    use crate::workflow::{SessionContext, WorkflowKind};
    use axum::extract::{Multipart, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct Received {
        parts: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
        auth: Arc<Mutex<Option<String>>>,
    }

    async fn accept_multipart(
        State(received): State<Received>,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> (StatusCode, Json<Value>) {
        *received.auth.lock() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            received.parts.lock().push((name, data));
        }
        (StatusCode::CREATED, Json(json!({ "id": "sub-42" })))
    }

    async fn accept_json(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
        received
            .parts
            .lock()
            .push(("json".to_string(), body.to_string().into_bytes()));
        StatusCode::ACCEPTED
    }

    async fn spawn_server() -> (String, Received) {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Received::default();
        let app = Router::new()
            .route("/submissions", post(accept_multipart))
            .route("/json", post(accept_json))
            .route(
                "/reject",
                post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "posting.title is required") }),
            )
            .route("/down", post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }))
            .with_state(received.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}"), received)
    }

    fn transfer(endpoint: String, mode: SubmissionMode) -> HttpTransfer {
        HttpTransfer::new(SubmissionConfig {
            endpoint,
            timeout_secs: 5,
            mode,
            chunk_size: 4,
        })
        .unwrap()
    }

    fn payload(with_clip: bool) -> SubmissionPayload {
        let draft = Draft::from_value(json!({ "personal": { "firstName": " Noor " } })).unwrap();
        let clip = RecordingClip::from_chunks(
            vec![
                MediaChunk { sequence: 0, data: b"0123456789".to_vec() },
                MediaChunk { sequence: 1, data: b"abcdef".to_vec() },
            ],
            "video/webm",
            Duration::from_secs(3),
        );
        SubmissionPayload::build(
            WorkflowKind::VideoProfile,
            &draft,
            with_clip.then_some(&clip),
            &SessionContext::authenticated("u-7", "tok-7"),
        )
    }

    #[tokio::test]
    async fn test_multipart_upload_streams_clip() {
        let (base, received) = spawn_server().await;
        let http = transfer(format!("{base}/submissions"), SubmissionMode::Multipart);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            ProgressSink::new(move |p| seen.lock().push(p))
        };
        let receipt = http.send(&payload(true), sink).await.unwrap();

        assert_eq!(receipt.status, 201);
        assert_eq!(receipt.reference.as_deref(), Some("sub-42"));
        assert_eq!(received.auth.lock().as_deref(), Some("Bearer tok-7"));

        let parts = received.parts.lock().clone();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, "fields");
        let fields: Value = serde_json::from_slice(&parts[0].1).unwrap();
        assert_eq!(fields["fields"]["personal"]["firstName"], json!("Noor"));
        assert_eq!(parts[1], ("video".to_string(), b"0123456789abcdef".to_vec()));

        let seen = seen.lock().clone();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.len() > 2);
    }

    #[tokio::test]
    async fn test_json_mode_sends_reference() {
        let (base, received) = spawn_server().await;
        let http = transfer(format!("{base}/json"), SubmissionMode::Json);

        let receipt = http.send(&payload(true), ProgressSink::ignore()).await.unwrap();
        assert_eq!(receipt.status, 202);
        assert_eq!(receipt.reference, None);

        let parts = received.parts.lock().clone();
        let body: Value = serde_json::from_slice(&parts[0].1).unwrap();
        assert!(body["clip"]["url"].as_str().unwrap().starts_with("blob:"));
        assert!(body.get("authToken").is_none());
    }

    #[tokio::test]
    async fn test_client_error_is_not_retryable() {
        let (base, _) = spawn_server().await;
        let http = transfer(format!("{base}/reject"), SubmissionMode::Multipart);
        let err = http.send(&payload(false), ProgressSink::ignore()).await.unwrap_err();
        assert_eq!(
            err,
            TransferError::ClientError {
                status: 422,
                detail: "posting.title is required".into()
            }
        );
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let (base, _) = spawn_server().await;
        let http = transfer(format!("{base}/down"), SubmissionMode::Json);
        let err = http.send(&payload(false), ProgressSink::ignore()).await.unwrap_err();
        assert!(matches!(err, TransferError::ServerError { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let http = transfer(format!("http://{addr}/submissions"), SubmissionMode::Json);
        let err = http.send(&payload(false), ProgressSink::ignore()).await.unwrap_err();
        assert!(matches!(err, TransferError::NetworkError(_)));
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for("video/webm;codecs=vp9"), "webm");
        assert_eq!(extension_for("video/quicktime"), "mov");
        assert_eq!(extension_for("application/octet-stream"), "bin");
    }
}
