//! Yelp-specific error types.

use thiserror::Error;

use crate::application::ports::SearchError;

/// Errors from the Yelp adapter.
#[derive(Debug, Error, Clone)]
pub enum YelpError {
    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Request failed before a response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// API rejected the credential.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// API throttled the request.
    #[error("Rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Response body was not valid JSON for the expected shape.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),
}

impl From<reqwest::Error> for YelpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::Http(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<YelpError> for SearchError {
    fn from(err: YelpError) -> Self {
        match err {
            YelpError::Http(message) | YelpError::Network(message) => {
                Self::ConnectionError { message }
            }
            YelpError::Timeout => Self::ConnectionError {
                message: "request timed out".to_string(),
            },
            YelpError::AuthenticationFailed => Self::Unauthorized,
            YelpError::RateLimited => Self::RateLimited,
            YelpError::Api { code, message } => Self::Provider { code, message },
            YelpError::JsonParse(message) => Self::InvalidResponse { message },
        }
    }
}
