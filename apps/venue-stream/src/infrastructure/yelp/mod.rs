//! Yelp Fusion Search Adapter
//!
//! Implementation of `BusinessSearchPort` against the Yelp Fusion
//! business search endpoint:
//! - One `GET /businesses/search` per pipeline run, `open_now=true`
//! - Bearer token authentication with the configured API key
//! - No retries; every failure maps to a `SearchError`

mod api_types;
mod client;
mod error;

pub use api_types::{YelpBusiness, YelpErrorBody, YelpErrorResponse, YelpSearchResponse};
pub use client::YelpClient;
pub use error::YelpError;
