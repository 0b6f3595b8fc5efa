//! Trigger Endpoint
//!
//! Validates `location`, `categories` and `rating` query parameters and
//! starts one pipeline per accepted request. The response never carries
//! results; those travel through the request's stream.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

use super::AppState;
use crate::application::services::PipelineRequest;
use crate::infrastructure::metrics::{self, TriggerOutcome};

/// Body of an accepted trigger.
pub const ACCEPTED_BODY: &str = "Request received. Processing businesses...";

/// Body of a rejected trigger.
pub const BAD_REQUEST_BODY: &str = "Bad request!";

/// Raw trigger query parameters.
///
/// Built from decoded query pairs. When a key repeats, its first value wins.
#[derive(Debug, Default, Clone)]
pub struct TriggerParams {
    /// Search location.
    pub location: Option<String>,
    /// Comma-separated category aliases.
    pub categories: Option<String>,
    /// Rating threshold, exclusive.
    pub rating: Option<String>,
}

impl TriggerParams {
    /// Turn raw parameters into a pipeline request.
    ///
    /// # Errors
    ///
    /// Returns a rejection if a parameter is missing, blank, or `rating` is
    /// not a finite number.
    pub fn validate(self) -> Result<PipelineRequest, TriggerRejection> {
        let location = required(self.location, "location")?;
        let categories = required(self.categories, "categories")?;
        let rating = required(self.rating, "rating")?;

        let threshold = rating
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(TriggerRejection::InvalidRating(rating))?;

        Ok(PipelineRequest::new(location, categories, threshold))
    }
}

impl FromIterator<(String, String)> for TriggerParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "location" => &mut params.location,
                "categories" => &mut params.categories,
                "rating" => &mut params.rating,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, TriggerRejection> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(TriggerRejection::MissingParameter(name))
}

/// Why a trigger was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerRejection {
    /// Parameter absent or blank.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// `rating` is not a finite number.
    #[error("invalid rating: {0}")]
    InvalidRating(String),

    /// Query string could not be decoded.
    #[error("malformed query: {0}")]
    MalformedQuery(String),
}

impl From<QueryRejection> for TriggerRejection {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedQuery(rejection.body_text())
    }
}

impl IntoResponse for TriggerRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, BAD_REQUEST_BODY).into_response()
    }
}

pub(super) async fn trigger_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    if method != Method::GET {
        metrics::record_trigger(TriggerOutcome::NotFound);
        return StatusCode::NOT_FOUND.into_response();
    }

    let request = match pairs
        .map_err(TriggerRejection::from)
        .and_then(|Query(pairs)| pairs.into_iter().collect::<TriggerParams>().validate())
    {
        Ok(request) => request,
        Err(rejection) => {
            tracing::debug!(reason = %rejection, "Trigger rejected");
            metrics::record_trigger(TriggerOutcome::BadRequest);
            return rejection.into_response();
        }
    };

    metrics::record_trigger(TriggerOutcome::Accepted);
    state.start_pipeline(request);

    (StatusCode::OK, ACCEPTED_BODY).into_response()
}
