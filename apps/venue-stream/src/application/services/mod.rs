//! Application Services
//!
//! - `RequestOrchestrator`: runs one fetch → select → emit pipeline
//! - `PipelineRegistry`: tracks in-flight pipelines and their subscriptions

mod pipeline;
mod registry;

pub use pipeline::{PipelineOutcome, PipelineRequest, PipelineState, RequestOrchestrator};
pub use registry::{PipelineRegistry, PipelineStats};
