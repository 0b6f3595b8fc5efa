//! HTTP Transport
//!
//! One axum router serves the pipeline trigger, health checks, and
//! Prometheus metrics.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns JSON health status with pipeline counters
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /metrics` - Prometheus metrics in text format
//! - Any other path - Trigger (`GET ?location=..&categories=..&rating=..`)

mod trigger;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub use trigger::{ACCEPTED_BODY, BAD_REQUEST_BODY, TriggerParams, TriggerRejection};

use crate::application::ports::{BusinessSearchPort, ObserverFactory};
use crate::application::services::{
    PipelineRegistry, PipelineRequest, PipelineStats, RequestOrchestrator,
};
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Pipeline counters.
    pub pipelines: PipelinesStatus,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Accepting triggers.
    Healthy,
    /// Shutting down; pipelines no longer deliver.
    Draining,
}

/// Pipeline counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PipelinesStatus {
    /// Pipelines currently running.
    pub active: usize,
    /// Pipelines started since process start.
    pub started: u64,
    /// Pipelines that completed.
    pub completed: u64,
    /// Pipelines that failed.
    pub failed: u64,
}

impl From<PipelineStats> for PipelinesStatus {
    fn from(stats: PipelineStats) -> Self {
        Self {
            active: stats.active,
            started: stats.started,
            completed: stats.completed,
            failed: stats.failed,
        }
    }
}

// =============================================================================
// Server State
// =============================================================================

/// Shared state for every handler.
pub struct AppState {
    version: String,
    started_at: Instant,
    search: Arc<dyn BusinessSearchPort>,
    observers: Arc<dyn ObserverFactory>,
    registry: Arc<PipelineRegistry>,
}

impl AppState {
    /// Create new server state.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        search: Arc<dyn BusinessSearchPort>,
        observers: Arc<dyn ObserverFactory>,
        registry: Arc<PipelineRegistry>,
    ) -> Self {
        Self {
            version: version.into(),
            started_at: Instant::now(),
            search,
            observers,
            registry,
        }
    }

    /// Pipeline registry shared with the shutdown path.
    #[must_use]
    pub const fn registry(&self) -> &Arc<PipelineRegistry> {
        &self.registry
    }

    /// Attach fresh observers to a new stream and run the pipeline in the
    /// background.
    pub fn start_pipeline(&self, request: PipelineRequest) -> Uuid {
        let orchestrator = RequestOrchestrator::new(self.observers.observers());
        let id = orchestrator.id();

        tracing::info!(
            request_id = %id,
            location = %request.query.location,
            categories = %request.query.categories,
            rating_threshold = request.rating_threshold,
            "Trigger accepted"
        );

        drop(orchestrator.spawn(
            Arc::clone(&self.search),
            request,
            Arc::clone(&self.registry),
        ));
        id
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("version", &self.version)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Build the service router.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(trigger::trigger_handler)
        .with_state(state)
}

// =============================================================================
// HTTP Server
// =============================================================================

/// Trigger and operational HTTP server.
pub struct HttpServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new server.
    #[must_use]
    pub const fn new(addr: SocketAddr, state: Arc<AppState>, cancel: CancellationToken) -> Self {
        Self {
            addr,
            state,
            cancel,
        }
    }

    /// Bind the configured address and serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::BindFailed(self.addr, e.to_string()))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the HTTP server fails while running.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let local_addr = listener.local_addr().unwrap_or(self.addr);
        tracing::info!(addr = %local_addr, "HTTP server listening");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Draining => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let status = if state.registry.is_released() {
        HealthStatus::Draining
    } else {
        HealthStatus::Healthy
    };

    HealthResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        pipelines: state.registry.stats().into(),
    }
}

// =============================================================================
// Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the listen address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
