//! HTTP surface for the document summarizer.
//!
//! - `POST /summarize` – Accepts a multipart form (`file` with a filename, or `text`) or a JSON
//!   body (`{"text": "..."}`) and returns `{"summary": "..."}`. When both `file` and `text`
//!   are present the file wins. Failures return `{"error": "...", "details"?: "..."}` with 400
//!   for input problems, 413 for oversized bodies, and 500 for processing failures.
//! - `GET /ping` – Liveness probe returning `{"message": "pong"}`.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Uploaded files are staged as temporary artifacts under the configured upload directory
//! before the pipeline runs; the pipeline deletes them on every exit path.

use crate::processing::{PipelineError, SummarizeApi, Submission, TemporaryArtifact, UploadedFile};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Settings the HTTP boundary needs to stage uploads.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Directory where uploads are written before processing.
    pub upload_dir: PathBuf,
    /// Maximum request body size in bytes.
    pub max_upload_bytes: usize,
}

struct AppState<S> {
    service: Arc<S>,
    upload_dir: Arc<PathBuf>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            upload_dir: Arc::clone(&self.upload_dir),
        }
    }
}

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>, settings: HttpSettings) -> Router
where
    S: SummarizeApi + 'static,
{
    let state = AppState {
        service,
        upload_dir: Arc::new(settings.upload_dir),
    };
    Router::new()
        .route("/summarize", post(summarize::<S>))
        .route("/ping", get(ping))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JSON request body for `POST /summarize`.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Text to summarize.
    #[serde(default)]
    text: Option<String>,
}

/// Success response for `POST /summarize`.
#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

/// Error body shared by every failing endpoint.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Summarize pasted text or an uploaded document.
///
/// The pipeline runs on its own task so that a client disconnect cannot interrupt it before
/// the uploaded file has been cleaned up.
async fn summarize<S>(
    State(state): State<AppState<S>>,
    request: Request,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummarizeApi + 'static,
{
    let submission = read_submission(&state, request).await?;
    let service = Arc::clone(&state.service);
    let summary = tokio::spawn(async move { service.summarize(submission).await })
        .await
        .map_err(|error| AppError::Internal(format!("summarization task failed: {error}")))??;
    Ok(Json(SummarizeResponse { summary }))
}

async fn read_submission<S>(state: &AppState<S>, request: Request) -> Result<Submission, AppError>
where
    S: SummarizeApi + 'static,
{
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        let Json(body) = Json::<SummarizeRequest>::from_request(request, &())
            .await
            .map_err(|rejection| AppError::rejected(rejection.status(), rejection.body_text()))?;
        return Ok(Submission::text(body.text.unwrap_or_default()));
    }

    let multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| AppError::rejected(rejection.status(), rejection.body_text()))?;
    read_multipart(state, multipart).await
}

async fn read_multipart<S>(
    state: &AppState<S>,
    mut multipart: Multipart,
) -> Result<Submission, AppError> {
    let mut text: Option<String> = None;
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(AppError::from_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") if upload.is_none() => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(AppError::from_multipart)?;
                let artifact = TemporaryArtifact::create(&state.upload_dir, &bytes)
                    .await
                    .map_err(|error| {
                        AppError::Internal(format!("failed to stage uploaded file: {error}"))
                    })?;
                tracing::info!(
                    file_name = %file_name,
                    content_type = ?content_type,
                    bytes = bytes.len(),
                    "Received upload"
                );
                upload = Some(UploadedFile {
                    artifact,
                    file_name,
                    content_type,
                });
            }
            Some("text") if text.is_none() => {
                text = Some(field.text().await.map_err(AppError::from_multipart)?);
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring multipart field");
            }
        }
    }

    match (upload, text) {
        (Some(upload), text) => {
            if text.is_some_and(|text| !text.trim().is_empty()) {
                tracing::debug!("Both file and text supplied; using the file");
            }
            Ok(Submission::File(upload))
        }
        (None, text) => Ok(Submission::text(text.unwrap_or_default())),
    }
}

/// Liveness probe.
async fn ping() -> Json<serde_json::Value> {
    tracing::debug!("Ping received");
    Json(json!({ "message": "pong" }))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Summarize pasted text (multipart `text` field or JSON body) or an uploaded PDF, DOCX, or TXT file (multipart `file` field). Response returns { \"summary\": string }.",
                request_example: Some(json!({
                    "text": "At least 100 characters of text to summarize..."
                })),
            },
            CommandDescriptor {
                name: "ping",
                method: "GET",
                path: "/ping",
                description: "Liveness probe. Response returns { \"message\": \"pong\" }.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    Pipeline(PipelineError),
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl AppError {
    /// Map an extractor rejection, keeping the body-limit case distinct.
    fn rejected(status: StatusCode, body_text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(body_text)
        } else {
            Self::BadRequest(body_text)
        }
    }

    fn from_multipart(error: axum::extract::multipart::MultipartError) -> Self {
        Self::rejected(error.status(), error.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Pipeline(error) => {
                let status = if error.is_input_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                if status.is_server_error() {
                    tracing::error!(stage = ?error.stage(), error = %error, "Summarization request failed");
                }
                (
                    status,
                    ErrorResponse {
                        error: error.message(),
                        details: error.details(),
                    },
                )
            }
            Self::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Invalid request body.".into(),
                    details: Some(details),
                },
            ),
            Self::PayloadTooLarge(details) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse {
                    error: "Request body is too large.".into(),
                    details: Some(details),
                },
            ),
            Self::Internal(details) => {
                tracing::error!(details = %details, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal server error.".into(),
                        details: Some(details),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self::Pipeline(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpSettings, create_router, get_commands};
    use crate::processing::{PipelineError, SummarizeApi, Submission};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Debug, Clone, PartialEq)]
    enum Recorded {
        Text(String),
        File {
            file_name: String,
            content_type: Option<String>,
            bytes: Vec<u8>,
        },
    }

    #[derive(Default)]
    struct StubSummarizeService {
        calls: Mutex<Vec<Recorded>>,
    }

    #[async_trait]
    impl SummarizeApi for StubSummarizeService {
        async fn summarize(&self, submission: Submission) -> Result<String, PipelineError> {
            let recorded = match submission {
                Submission::Text { content } => Recorded::Text(content),
                Submission::File(upload) => {
                    let bytes = upload.artifact.read().await.expect("artifact readable");
                    let recorded = Recorded::File {
                        file_name: upload.file_name,
                        content_type: upload.content_type,
                        bytes,
                    };
                    upload.artifact.release().await;
                    recorded
                }
            };
            self.calls.lock().await.push(recorded);
            Ok("stub summary".into())
        }
    }

    fn settings(dir: &std::path::Path, max_upload_bytes: usize) -> HttpSettings {
        HttpSettings {
            upload_dir: dir.to_path_buf(),
            max_upload_bytes,
        }
    }

    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        const BOUNDARY: &str = "docsum-test-boundary";
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/summarize")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json body")
    }

    #[tokio::test]
    async fn commands_catalog_exposes_summarize_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let summarize = commands
            .iter()
            .find(|cmd| cmd.name == "summarize")
            .expect("summarize command present");

        assert_eq!(summarize.method, "POST");
        assert_eq!(summarize.path, "/summarize");
        assert!(commands.iter().any(|cmd| cmd.path == "/ping"));
    }

    #[tokio::test]
    async fn ping_returns_pong() {
        let dir = tempdir().expect("temp dir");
        let app = create_router(
            Arc::new(StubSummarizeService::default()),
            settings(dir.path(), 1024),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ping")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "message": "pong" }));
    }

    #[tokio::test]
    async fn json_text_is_forwarded() {
        let dir = tempdir().expect("temp dir");
        let service = Arc::new(StubSummarizeService::default());
        let app = create_router(service.clone(), settings(dir.path(), 1024));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "text": "Pasted body" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["summary"], "stub summary");
        assert_eq!(
            *service.calls.lock().await,
            vec![Recorded::Text("Pasted body".into())]
        );
    }

    #[tokio::test]
    async fn file_takes_precedence_over_text() {
        let dir = tempdir().expect("temp dir");
        let service = Arc::new(StubSummarizeService::default());
        let app = create_router(service.clone(), settings(dir.path(), 1024 * 1024));

        let response = app
            .oneshot(multipart_request(&[
                ("text", None, b"ignored text".as_slice()),
                ("file", Some("notes.txt"), b"file contents".as_slice()),
            ]))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let calls = service.calls.lock().await;
        assert_eq!(
            *calls,
            vec![Recorded::File {
                file_name: "notes.txt".into(),
                content_type: Some("application/octet-stream".into()),
                bytes: b"file contents".to_vec(),
            }]
        );
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn missing_fields_become_empty_text() {
        let dir = tempdir().expect("temp dir");
        let service = Arc::new(StubSummarizeService::default());
        let app = create_router(service.clone(), settings(dir.path(), 1024));

        let response = app
            .oneshot(multipart_request(&[("comment", None, b"unrelated".as_slice())]))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*service.calls.lock().await, vec![Recorded::Text(String::new())]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let dir = tempdir().expect("temp dir");
        let app = create_router(
            Arc::new(StubSummarizeService::default()),
            settings(dir.path(), 1024),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid request body.");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let dir = tempdir().expect("temp dir");
        let service = Arc::new(StubSummarizeService::default());
        let app = create_router(service.clone(), settings(dir.path(), 64));

        let payload = vec![b'a'; 4096];
        let response = app
            .oneshot(multipart_request(&[("file", Some("big.txt"), payload.as_slice())]))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(service.calls.lock().await.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).map(|entries| entries.count()).unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn oversized_json_body_is_rejected_as_too_large() {
        let dir = tempdir().expect("temp dir");
        let service = Arc::new(StubSummarizeService::default());
        let app = create_router(service.clone(), settings(dir.path(), 64));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "text": "a".repeat(4096) }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["error"], "Request body is too large.");
        assert!(service.calls.lock().await.is_empty());
    }
}
