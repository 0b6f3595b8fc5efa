#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Venue Stream - Search Result Multicaster
//!
//! An HTTP-triggered service that searches the Yelp Fusion API for open
//! venues, keeps the well-reviewed cheapest ones, and multicasts each
//! result to several independent observers.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core types with no I/O
//!   - `business`: Business record, price rank, cheapest-tier selection
//!   - `stream`: Multicast subject, observers, subscriptions
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Search port, search errors, observer factory
//!   - `services`: Request orchestrator, pipeline registry
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `yelp`: Yelp Fusion HTTP client
//!   - `http`: Trigger endpoint and operational routes
//!   - `observers`: Console and channel sinks
//!   - `config`: Environment configuration
//!
//! # Data Flow
//!
//! ```text
//! GET /?location&categories&rating
//!         │
//!         ▼
//!   ┌──────────────┐    ┌────────────┐    ┌─────────┐──► Observer 1
//!   │ Orchestrator │───►│ Yelp search│───►│ Subject │──► Observer 2
//!   └──────────────┘    └────────────┘    └─────────┘──► Observer N
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core types with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::business::{Business, price_rank, select_cheapest};
pub use domain::stream::{
    Observer, SharedObserver, StreamClosed, StreamEvent, Subject, Subscription,
};

// Ports
pub use application::ports::{
    BusinessObserver, BusinessSearchPort, BusinessStream, ObserverFactory, SearchError,
    SearchQuery,
};

// Services
pub use application::services::{
    PipelineOutcome, PipelineRegistry, PipelineRequest, PipelineState, PipelineStats,
    RequestOrchestrator,
};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, Credentials, ObserverSettings, ServerSettings, VenueStreamConfig, YelpSettings,
};

// HTTP server
pub use infrastructure::http::{AppState, HttpServer, ServerError, create_router};

// Observers
pub use infrastructure::observers::{
    BusinessEvent, ChannelObserver, ConsoleObserver, ConsoleObserverFactory,
};

// Search adapter
pub use infrastructure::yelp::{YelpClient, YelpError};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
