//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the request orchestrator and the port interfaces
//! that define how the pipeline reaches the search provider and its sinks.

/// Port interfaces for the search provider and observers.
pub mod ports;

/// Request orchestration and pipeline bookkeeping.
pub mod services;
