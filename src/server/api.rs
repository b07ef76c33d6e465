//! HTTP endpoints.
//!
//! - `GET  /health` - liveness, independent of the brokerage session
//! - `POST /ingest` (alias `/ingest/csv`) - multipart upload of trade lines
//! - `POST /query` - templated answer over the most recent lines
//! - `GET  /recent`, `/search`, `/stats` - document store reads
//! - `GET  /session`, `GET|POST /connect`, `POST /logout` - session lifecycle
//! - `GET  /balance`, `POST /ltp`, `POST /option-chain` - brokerage data

use std::sync::Arc;

use axum::{
    extract::{
        multipart::Multipart,
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::application::answer::Answer;
use crate::application::ingest::DEFAULT_SOURCE;
use crate::application::session::{ConnectOutcome, SessionStatus};
use crate::domain::entities::document::Document;
use crate::domain::error::DomainError;
use crate::domain::ports::broker::{OptionChainRequest, QuoteRequest};
use crate::domain::ports::document_repository::DocumentStats;
use crate::domain::values::recent_limit::RecentLimit;
use crate::BotPro;

// ============================================================================
// API Types
// ============================================================================

/// Body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub status: String,
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            error: error.into(),
            message: message.into(),
        }
    }
}

type ApiFailure = (StatusCode, Json<ApiError>);
type ApiResult<T> = Result<Json<T>, ApiFailure>;

fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Session(_) | DomainError::SessionExpired(_) => StatusCode::BAD_GATEWAY,
        DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        DomainError::Storage(_) | DomainError::Configuration(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn reject(err: DomainError) -> ApiFailure {
    let status = status_for(&err);
    if err.is_caller_fault() {
        warn!(error = %err, "Rejected request");
    } else {
        error!(error = %err, kind = err.kind(), "Request failed");
    }
    (status, Json(ApiError::new(err.kind(), err.to_string())))
}

fn invalid(message: impl Into<String>) -> ApiFailure {
    reject(DomainError::Validation(message.into()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
    pub lines: usize,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub q: String,
    #[serde(default)]
    pub n: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub n: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub outcome: ConnectOutcome,
}

#[derive(Debug, Serialize)]
pub struct BrokerResponse {
    pub status: &'static str,
    pub data: serde_json::Value,
}

impl BrokerResponse {
    fn ok(data: serde_json::Value) -> Self {
        Self { status: "ok", data }
    }
}

// ============================================================================
// API State
// ============================================================================

#[derive(Clone)]
pub struct ApiState {
    pub app: Arc<BotPro>,
}

impl ApiState {
    pub fn new(app: Arc<BotPro>) -> Self {
        Self { app }
    }

    /// Runs a store call off the async runtime; SQLite calls block.
    async fn blocking<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&BotPro) -> Result<T, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        let app = self.app.clone();
        tokio::task::spawn_blocking(move || f(&app))
            .await
            .map_err(|e| DomainError::Storage(format!("store task failed: {e}")))?
    }
}

// ============================================================================
// API Handlers
// ============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "backend running" }))
}

/// GET /health - always 200, whatever the session state.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// POST /ingest - the `file` part (or the first file part) is the raw text;
/// an optional `source` text part labels the lines.
async fn ingest(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> ApiResult<IngestResponse> {
    let mut source: Option<String> = None;
    let mut body: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some() || name == "file";

        if name == "source" && !is_file {
            let value = field
                .text()
                .await
                .map_err(|e| invalid(format!("unreadable source field: {e}")))?;
            source = Some(value);
        } else if is_file && body.is_none() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| invalid(format!("unreadable upload: {e}")))?;
            body = Some(String::from_utf8_lossy(&bytes).into_owned());
        }
    }

    let body = body.ok_or_else(|| invalid("multipart body has no file part"))?;
    let source = source.unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let report = state
        .blocking(move |app| app.ingest(&source, &body))
        .await
        .map_err(reject)?;

    Ok(Json(IngestResponse {
        status: "ok".into(),
        lines: report.lines,
        source: report.source,
    }))
}

/// POST /query - `{q, n?}`.
async fn query(
    State(state): State<ApiState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Answer> {
    let Json(req) = payload.map_err(|e| invalid(e.body_text()))?;
    let limit = req.n.unwrap_or(RecentLimit::DEFAULT as i64);

    let answer = state
        .blocking(move |app| app.answer(&req.q, limit))
        .await
        .map_err(reject)?;
    Ok(Json(answer))
}

/// GET /recent?n= - newest first.
async fn recent(
    State(state): State<ApiState>,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> ApiResult<Vec<Document>> {
    let Query(params) = params.map_err(|e| invalid(e.body_text()))?;
    let limit = params.n.unwrap_or(RecentLimit::DEFAULT as i64);

    let docs = state
        .blocking(move |app| app.recent(limit))
        .await
        .map_err(reject)?;
    Ok(Json(docs))
}

/// GET /search?q=&limit=
async fn search(
    State(state): State<ApiState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Vec<Document>> {
    let Query(params) = params.map_err(|e| invalid(e.body_text()))?;
    let text = params.q.ok_or_else(|| invalid("missing query parameter: q"))?;
    let limit = params.limit.unwrap_or(10);

    let docs = state
        .blocking(move |app| app.search(&text, limit))
        .await
        .map_err(reject)?;
    Ok(Json(docs))
}

async fn stats(State(state): State<ApiState>) -> ApiResult<DocumentStats> {
    let stats = state.blocking(|app| app.stats()).await.map_err(reject)?;
    Ok(Json(stats))
}

/// GET /session - reports state without logging in.
async fn session_status(State(state): State<ApiState>) -> Json<SessionStatus> {
    Json(state.app.session_status())
}

/// GET|POST /connect - forces a fresh login.
async fn connect(State(state): State<ApiState>) -> impl IntoResponse {
    let outcome = state.app.connect().await;
    let code = if outcome.connected {
        StatusCode::OK
    } else if outcome.error.as_deref() == Some("timeout") {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    };
    let status = if outcome.connected { "ok" } else { "error" };
    (code, Json(ConnectResponse { status, outcome }))
}

async fn logout(State(state): State<ApiState>) -> ApiResult<serde_json::Value> {
    state.app.logout().await.map_err(reject)?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

async fn balance(State(state): State<ApiState>) -> ApiResult<BrokerResponse> {
    let data = state.app.balance().await.map_err(reject)?;
    Ok(Json(BrokerResponse::ok(data)))
}

async fn ltp(
    State(state): State<ApiState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<BrokerResponse> {
    let Json(quote) = payload.map_err(|e| invalid(e.body_text()))?;
    let data = state.app.ltp(&quote).await.map_err(reject)?;
    Ok(Json(BrokerResponse::ok(data)))
}

async fn option_chain(
    State(state): State<ApiState>,
    payload: Result<Json<OptionChainRequest>, JsonRejection>,
) -> ApiResult<BrokerResponse> {
    let Json(request) = payload.map_err(|e| invalid(e.body_text()))?;
    let data = state.app.option_chain(&request).await.map_err(reject)?;
    Ok(Json(BrokerResponse::ok(data)))
}

// ============================================================================
// Router Configuration
// ============================================================================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/ingest/csv", post(ingest))
        .route("/query", post(query))
        .route("/recent", get(recent))
        .route("/search", get(search))
        .route("/stats", get(stats))
        .route("/session", get(session_status))
        .route("/connect", get(connect).post(connect))
        .route("/logout", post(logout))
        .route("/balance", get(balance))
        .route("/ltp", post(ltp))
        .route("/option-chain", post(option_chain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API until ctrl-c.
pub async fn run_server(bind_addr: &str, app: Arc<BotPro>) -> std::io::Result<()> {
    let router = create_router(ApiState::new(app));
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(addr = %listener.local_addr()?, "HTTP API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
}
