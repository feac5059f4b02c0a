//! HTTP surface for automation callers.
//!
//! - `GET /` reports liveness, uptime and the number of tracked jobs.
//! - `POST /generate` submits `{prompt, webhook_url?}`.
//! - `GET /status/{job_id}` returns the job snapshot.
//!
//! Failures answer with `{"error": "..."}`.

use crate::job::{
    domain::{Job, JobId, JobStatus},
    ports::{ChatTransport, JobStore, WebhookNotifier},
    services::{JobLifecycleError, JobLifecycleService, SubmitJobRequest},
};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Shared state of the HTTP handlers.
pub struct HttpState<S, T, N, C>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    service: Arc<JobLifecycleService<S, T, N, C>>,
    started_at: Instant,
}

impl<S, T, N, C> HttpState<S, T, N, C>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    /// Creates handler state around the lifecycle service.
    #[must_use]
    pub fn new(service: Arc<JobLifecycleService<S, T, N, C>>) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }
}

impl<S, T, N, C> Clone for HttpState<S, T, N, C>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            started_at: self.started_at,
        }
    }
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    /// Prompt text; required.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Callback URL; the configured default applies when absent.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Successful answer of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Always `true`.
    pub success: bool,
    /// Identifier to poll and to expect in the webhook.
    pub job_id: String,
    /// Acceptance message.
    pub message: String,
    /// Completion estimate.
    pub estimated_time: String,
}

/// Answer of `GET /status/{job_id}`.
///
/// Field names and the millisecond epoch timestamps follow the job records
/// that automation callers already poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    /// Job identifier.
    #[serde(rename = "jobId")]
    pub job_id: String,
    /// Submitted prompt.
    pub prompt: String,
    /// Callback URL, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Lifecycle status.
    pub status: JobStatus,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Result image location, once completed.
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Completion time in milliseconds since the Unix epoch, once completed.
    #[serde(rename = "completedAt", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id().to_string(),
            prompt: job.prompt().as_str().to_owned(),
            webhook_url: job.callback_target().map(|target| target.as_str().to_owned()),
            status: job.status(),
            timestamp: job.created_at().timestamp_millis(),
            image_url: job.result_reference().map(|result| result.as_str().to_owned()),
            completed_at: job.completed_at().map(|at| at.timestamp_millis()),
        }
    }
}

/// Answer of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Seconds since the router was built.
    pub uptime_secs: u64,
    /// Jobs currently held in the store.
    pub tracked_jobs: usize,
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub error: String,
}

/// Failure rendered as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// The lifecycle service rejected or failed the request.
    Lifecycle(JobLifecycleError),
    /// The path does not contain a well-formed job identifier.
    UnknownJob(String),
    /// The request body is missing or is not the expected JSON.
    MalformedBody(JsonRejection),
}

impl From<JobLifecycleError> for ApiError {
    fn from(err: JobLifecycleError) -> Self {
        Self::Lifecycle(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::UnknownJob(raw) => (StatusCode::NOT_FOUND, format!("job {raw} not found")),
            Self::MalformedBody(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("prompt is required: {}", rejection.body_text()),
            ),
            Self::Lifecycle(err) => {
                let status = match &err {
                    JobLifecycleError::Validation(_) => StatusCode::BAD_REQUEST,
                    JobLifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
                    JobLifecycleError::TransportUnavailable(_) | JobLifecycleError::Store(_) => {
                        error!(error = %err, "request failed");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string())
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Builds the router.
pub fn router<S, T, N, C>(state: HttpState<S, T, N, C>) -> Router
where
    S: JobStore + 'static,
    T: ChatTransport + 'static,
    N: WebhookNotifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(health::<S, T, N, C>))
        .route("/generate", post(generate::<S, T, N, C>))
        .route("/status/{job_id}", get(job_status::<S, T, N, C>))
        .with_state(state)
}

/// Serves the router on `addr` until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns I/O errors from binding or serving.
pub async fn serve<S, T, N, C>(
    state: HttpState<S, T, N, C>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    S: JobStore + 'static,
    T: ChatTransport + 'static,
    N: WebhookNotifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "HTTP server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

async fn health<S, T, N, C>(
    State(state): State<HttpState<S, T, N, C>>,
) -> Result<Json<HealthResponse>, ApiError>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    let tracked_jobs = state.service.tracked_jobs().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_owned(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        tracked_jobs,
    }))
}

async fn generate<S, T, N, C>(
    State(state): State<HttpState<S, T, N, C>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    let Json(body) = body?;
    let mut request = SubmitJobRequest::new(body.prompt.unwrap_or_default());
    if let Some(webhook_url) = body.webhook_url {
        request = request.with_callback_target(webhook_url);
    }
    let submitted = state.service.submit(request).await?;
    Ok(Json(GenerateResponse {
        success: true,
        job_id: submitted.job_id.to_string(),
        message: submitted.accepted_message,
        estimated_time: submitted.estimate,
    }))
}

async fn job_status<S, T, N, C>(
    State(state): State<HttpState<S, T, N, C>>,
    Path(raw_job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError>
where
    S: JobStore,
    T: ChatTransport,
    N: WebhookNotifier,
    C: Clock + Send + Sync,
{
    let Ok(job_id) = JobId::parse(&raw_job_id) else {
        return Err(ApiError::UnknownJob(raw_job_id));
    };
    let job = state
        .service
        .query(job_id)
        .await?
        .ok_or(JobLifecycleError::NotFound(job_id))?;
    Ok(Json(JobStatusResponse::from(&job)))
}
