//! Domain Layer - Venue records and the multicast stream.
//!
//! Pure Rust with no I/O. The stream primitive is generic; the pipeline
//! instantiates it with [`business::Business`] items.

/// Business records and the filter/sort stage.
pub mod business;

/// Multicast subject, observers, and subscriptions.
pub mod stream;
