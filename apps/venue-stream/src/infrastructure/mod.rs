//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Configuration loading.
pub mod config;

/// Trigger endpoint, health checks, and the HTTP server.
pub mod http;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Console and channel observers.
pub mod observers;

/// OpenTelemetry tracing integration.
pub mod telemetry;

/// Yelp Fusion search adapter.
pub mod yelp;
