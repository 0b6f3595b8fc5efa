//! Port Interfaces
//!
//! Contracts the pipeline depends on, implemented by infrastructure
//! adapters.
//!
//! ## Driven Ports (Outbound)
//!
//! - `BusinessSearchPort`: one search call against the venue provider
//! - `ObserverFactory`: the sinks attached to each request's stream

use async_trait::async_trait;

use crate::domain::business::Business;
use crate::domain::stream::{SharedObserver, Subject};

// =============================================================================
// Search Port
// =============================================================================

/// Validated search parameters for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-form location (city, address, postal code).
    pub location: String,
    /// Comma-separated provider category aliases.
    pub categories: String,
}

impl SearchQuery {
    /// Create a search query.
    #[must_use]
    pub fn new(location: impl Into<String>, categories: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            categories: categories.into(),
        }
    }
}

/// Search failure reported to observers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Network failure or timeout reaching the provider.
    #[error("Search connection error: {message}")]
    ConnectionError {
        /// Underlying error message.
        message: String,
    },

    /// The provider rejected the credential.
    #[error("Search provider rejected the API key")]
    Unauthorized,

    /// The provider throttled the request.
    #[error("Search provider rate limited the request")]
    RateLimited,

    /// The provider answered with an error.
    #[error("Search provider error: {code} - {message}")]
    Provider {
        /// Provider error code.
        code: String,
        /// Provider error description.
        message: String,
    },

    /// The provider response could not be decoded.
    #[error("Invalid search response: {message}")]
    InvalidResponse {
        /// Decoding error message.
        message: String,
    },
}

/// Port for the venue search provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusinessSearchPort: Send + Sync {
    /// Return every currently-open business matching the query, unfiltered
    /// and in provider order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Business>, SearchError>;
}

// =============================================================================
// Observer Port
// =============================================================================

/// The multicast stream carried by each pipeline run.
pub type BusinessStream = Subject<Business, SearchError>;

/// Observer of a [`BusinessStream`].
pub type BusinessObserver = SharedObserver<Business, SearchError>;

/// Supplies the observers attached to each request's stream.
pub trait ObserverFactory: Send + Sync {
    /// Build a fresh observer set for one request.
    fn observers(&self) -> Vec<BusinessObserver>;
}
