//! JSON HTTP API.
//!
//! Exposes one assistant [`Session`] to browser or script clients. The
//! server holds no state of its own beyond the session; every handler
//! reads or advances the session's published snapshot.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/state` | Documents, messages, error banner, busy flag |
//! | `POST` | `/documents` | Upload files (base64 bodies) |
//! | `POST` | `/documents/drive` | Ingest files picked in Google Drive |
//! | `POST` | `/messages` | Ask a question, returns the reply |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "busy", "message": "busy: Thinking..." } }
//! ```
//!
//! Error codes: `bad_request` (400), `payload_too_large` (413), `busy`
//! (409), `internal` (500). Malformed or oversized request bodies use the
//! same envelope. Per-file ingestion failures are not HTTP errors; they are reported in
//! the response body and the state's error banner.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a static web page
//! can talk to a locally running server.
//!
//! # Body Limit
//!
//! Request bodies may be up to `[server].max_body_bytes`. Upload contents
//! are base64, so one file can be roughly three quarters of that.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::drive::{DriveClient, DriveFile};
use crate::models::{Message, SourceFile};
use crate::session::{IngestReport, Session, SessionError};
use crate::synthesizer::create_synthesizer;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub config: Arc<Config>,
}

/// Starts the HTTP server on `[server].bind` with a fresh session.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let synthesizer = create_synthesizer(&config.synthesizer)?;
    let session = Arc::new(Session::new(
        Arc::from(synthesizer),
        config.retrieval.clone(),
    ));
    let state = AppState {
        session,
        config: Arc::new(config.clone()),
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "docent server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Builds the API router. Exposed so tests and embedders can serve it on
/// their own listener.
pub fn router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/state", get(handle_state))
        .route("/documents", post(handle_upload))
        .route("/documents/drive", post(handle_drive))
        .route("/messages", post(handle_message))
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Busy(_) => AppError {
                status: StatusCode::CONFLICT,
                code: "busy",
                message: err.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "payload_too_large"
        } else {
            "bad_request"
        };
        AppError {
            status,
            code,
            message: rejection.body_text(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /state ============

async fn handle_state(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.session.snapshot();
    let activity = state.session.activity();
    Json(serde_json::json!({
        "state": snapshot.view(),
        "busy": activity.is_some(),
        "activity": activity.map(|a| a.label()),
    }))
}

// ============ POST /documents ============

#[derive(Deserialize)]
struct UploadRequest {
    files: Vec<UploadFile>,
}

#[derive(Deserialize)]
struct UploadFile {
    name: String,
    #[serde(default)]
    mime_type: String,
    content_base64: String,
}

#[derive(Serialize)]
struct IngestResponse {
    added: Vec<String>,
    duplicates: Vec<String>,
    failed: Vec<FailedFile>,
}

#[derive(Serialize)]
struct FailedFile {
    name: String,
    reason: String,
}

impl From<IngestReport> for IngestResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            added: report.added,
            duplicates: report.duplicates,
            failed: report
                .failed
                .into_iter()
                .map(|(name, reason)| FailedFile { name, reason })
                .collect(),
        }
    }
}

async fn handle_upload(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(req) = payload?;
    if req.files.is_empty() {
        return Err(bad_request("files must not be empty"));
    }

    let mut files = Vec::with_capacity(req.files.len());
    for f in req.files {
        let bytes = STANDARD
            .decode(f.content_base64.as_bytes())
            .map_err(|e| bad_request(format!("{}: invalid base64 content: {}", f.name, e)))?;
        files.push(SourceFile::new(f.name, f.mime_type, bytes));
    }

    let report = state.session.ingest_files(files).await?;
    Ok(Json(report.into()))
}

// ============ POST /documents/drive ============

#[derive(Deserialize)]
struct DriveRequest {
    files: Vec<DriveFile>,
}

async fn handle_drive(
    State(state): State<AppState>,
    payload: Result<Json<DriveRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(req) = payload?;
    if req.files.is_empty() {
        return Err(bad_request("files must not be empty"));
    }
    let client = DriveClient::from_config(&state.config.drive).map_err(|e| internal(e.to_string()))?;
    let report = state.session.ingest_drive_files(&client, req.files).await?;
    Ok(Json(report.into()))
}

// ============ POST /messages ============

#[derive(Deserialize)]
struct MessageRequest {
    content: String,
}

#[derive(Serialize)]
struct MessageResponse {
    reply: Message,
}

async fn handle_message(
    State(state): State<AppState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(req) = payload?;
    match state.session.send_message(&req.content).await? {
        Some(reply) => Ok(Json(MessageResponse { reply })),
        None => Err(bad_request("content must not be empty")),
    }
}
