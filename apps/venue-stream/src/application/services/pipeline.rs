//! Request Orchestrator
//!
//! One orchestrator per inbound trigger. It owns a fresh stream, attaches
//! the request's observers before anything is produced, then drives
//! `Idle → Fetching → Processing → Emitting → Completed | Failed`.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::registry::PipelineRegistry;
use crate::application::ports::{
    BusinessObserver, BusinessSearchPort, BusinessStream, SearchQuery,
};
use crate::domain::business::select_cheapest;
use crate::domain::stream::Subscription;
use crate::infrastructure::metrics;

// =============================================================================
// Types
// =============================================================================

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Created, observers attached, nothing fetched yet.
    Idle,
    /// Waiting on the search provider.
    Fetching,
    /// Selecting and ordering candidates.
    Processing,
    /// Pushing selected businesses into the stream.
    Emitting,
    /// Every selected business delivered, completion sent.
    Completed,
    /// The search failed, error sent.
    Failed,
}

impl PipelineState {
    /// State name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Processing => "processing",
            Self::Emitting => "emitting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the run has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Completed after emitting `emitted` businesses.
    Completed {
        /// Number of businesses emitted.
        emitted: usize,
    },
    /// The search failed and the stream carried the error.
    Failed,
}

impl PipelineOutcome {
    /// Outcome label for metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Validated trigger parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRequest {
    /// What to search for.
    pub query: SearchQuery,
    /// Ratings must be strictly above this value.
    pub rating_threshold: f64,
}

impl PipelineRequest {
    /// Create a pipeline request.
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        categories: impl Into<String>,
        rating_threshold: f64,
    ) -> Self {
        Self {
            query: SearchQuery::new(location, categories),
            rating_threshold,
        }
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Per-request coordinator wiring one stream to its observers.
pub struct RequestOrchestrator {
    id: Uuid,
    stream: BusinessStream,
    subscriptions: Vec<Subscription>,
    state: PipelineState,
}

impl RequestOrchestrator {
    /// Create a stream and subscribe every observer to it.
    #[must_use]
    pub fn new(observers: Vec<BusinessObserver>) -> Self {
        let stream = BusinessStream::new();
        let subscriptions = observers
            .into_iter()
            .map(|observer| stream.subscribe(observer))
            .collect();

        Self {
            id: Uuid::new_v4(),
            stream,
            subscriptions,
            state: PipelineState::Idle,
        }
    }

    /// Request identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Subscriptions still held by this orchestrator.
    #[must_use]
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Run the pipeline on a dedicated task.
    ///
    /// Subscriptions move into `registry`, which releases them when the run
    /// terminates or the server shuts down.
    pub fn spawn(
        mut self,
        search: Arc<dyn BusinessSearchPort>,
        request: PipelineRequest,
        registry: Arc<PipelineRegistry>,
    ) -> JoinHandle<PipelineOutcome> {
        let id = self.id;
        registry.register(id, std::mem::take(&mut self.subscriptions));

        let span = tracing::info_span!("pipeline", request_id = %id);
        tokio::spawn(
            async move {
                let outcome = self.run(search.as_ref(), &request).await;
                registry.finish(id, outcome);
                outcome
            }
            .instrument(span),
        )
    }

    /// Drive fetch → select → emit to termination on the current task.
    ///
    /// Consumes the orchestrator: a stream terminates once, so a run cannot
    /// be repeated.
    ///
    /// ```compile_fail
    /// # use venue_stream::{BusinessSearchPort, PipelineRequest, RequestOrchestrator};
    /// # async fn twice(search: &dyn BusinessSearchPort) {
    /// let orchestrator = RequestOrchestrator::new(Vec::new());
    /// let request = PipelineRequest::new("Nis", "bars", 4.5);
    /// orchestrator.run(search, &request).await;
    /// orchestrator.run(search, &request).await;
    /// # }
    /// ```
    pub async fn run(
        mut self,
        search: &dyn BusinessSearchPort,
        request: &PipelineRequest,
    ) -> PipelineOutcome {
        tracing::info!(
            location = %request.query.location,
            categories = %request.query.categories,
            rating_threshold = request.rating_threshold,
            observers = self.stream.observer_count(),
            "Pipeline started"
        );

        self.transition(PipelineState::Fetching);
        let started = Instant::now();
        let result = search.search(&request.query).await;
        metrics::record_fetch_duration(started.elapsed());

        let candidates = match result {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(error = %error, "Search failed");
                self.transition(PipelineState::Failed);
                let _ = self.stream.fail(&error);
                return PipelineOutcome::Failed;
            }
        };

        self.transition(PipelineState::Processing);
        let candidate_count = candidates.len();
        let selected = select_cheapest(candidates, request.rating_threshold);

        self.transition(PipelineState::Emitting);
        let emitted = selected
            .iter()
            .take_while(|business| self.stream.emit(business).is_ok())
            .count();
        metrics::record_businesses_emitted(emitted as u64);

        self.transition(PipelineState::Completed);
        let _ = self.stream.complete();

        tracing::info!(
            candidates = candidate_count,
            selected = selected.len(),
            emitted,
            "Pipeline completed"
        );
        PipelineOutcome::Completed { emitted }
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = self.state.as_str(), to = next.as_str(), "Pipeline state");
        self.state = next;
    }
}

impl std::fmt::Debug for RequestOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOrchestrator")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
