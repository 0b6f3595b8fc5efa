//! HTTP client for the Yelp Fusion business search endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::api_types::{YelpBusiness, YelpErrorResponse, YelpSearchResponse};
use super::error::YelpError;
use crate::application::ports::{BusinessSearchPort, SearchError, SearchQuery};
use crate::domain::business::Business;
use crate::infrastructure::config::{Credentials, YelpSettings};

const SEARCH_PATH: &str = "/businesses/search";

/// Yelp Fusion search client.
#[derive(Clone)]
pub struct YelpClient {
    client: Client,
    api_key: String,
    base_url: String,
    search_limit: u32,
}

impl YelpClient {
    /// Create a new client from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot
    /// be built.
    pub fn new(credentials: &Credentials, settings: &YelpSettings) -> Result<Self, YelpError> {
        if credentials.api_key().is_empty() {
            return Err(YelpError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| YelpError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: credentials.api_key().to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            search_limit: settings.search_limit,
        })
    }

    /// Search currently-open businesses for `query`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or an
    /// undecodable body.
    pub async fn search_businesses(
        &self,
        query: &SearchQuery,
    ) -> Result<YelpSearchResponse, YelpError> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);
        let limit = self.search_limit.to_string();

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[
                ("location", query.location.as_str()),
                ("categories", query.categories.as_str()),
                ("open_now", "true"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed: YelpSearchResponse =
                serde_json::from_str(&body).map_err(|e| YelpError::JsonParse(e.to_string()))?;
            tracing::debug!(
                returned = parsed.businesses.len(),
                total = parsed.total,
                "Search response received"
            );
            return Ok(parsed);
        }

        Err(error_for_status(status, &body))
    }
}

#[async_trait]
impl BusinessSearchPort for YelpClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Business>, SearchError> {
        let response = self.search_businesses(query).await?;
        let returned = response.businesses.len();
        let businesses: Vec<Business> = response
            .businesses
            .into_iter()
            .filter_map(YelpBusiness::into_business)
            .collect();

        if businesses.len() < returned {
            tracing::debug!(
                skipped = returned - businesses.len(),
                "Skipped unnamed businesses"
            );
        }
        Ok(businesses)
    }
}

impl std::fmt::Debug for YelpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YelpClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("search_limit", &self.search_limit)
            .finish_non_exhaustive()
    }
}

/// Map a non-success response to an adapter error.
fn error_for_status(status: StatusCode, body: &str) -> YelpError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => YelpError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => YelpError::RateLimited,
        _ => match serde_json::from_str::<YelpErrorResponse>(body) {
            Ok(err) => YelpError::Api {
                code: err.error.code,
                message: err.error.description,
            },
            Err(_) => YelpError::Api {
                code: status.as_u16().to_string(),
                message: body.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let err = YelpClient::new(&Credentials::new(String::new()), &YelpSettings::default())
            .unwrap_err();
        assert!(matches!(err, YelpError::AuthenticationFailed));
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = YelpClient::new(
            &Credentials::new("super-secret".to_string()),
            &YelpSettings::default(),
        )
        .unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn unauthorized_maps_to_auth_failure() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, ""),
            YelpError::AuthenticationFailed
        ));
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, ""),
            YelpError::AuthenticationFailed
        ));
    }

    #[test]
    fn too_many_requests_maps_to_rate_limited() {
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, ""),
            YelpError::RateLimited
        ));
    }

    #[test]
    fn error_envelope_is_decoded() {
        let body = r#"{"error":{"code":"VALIDATION_ERROR","description":"bad location"}}"#;
        match error_for_status(StatusCode::BAD_REQUEST, body) {
            YelpError::Api { code, message } => {
                assert_eq!(code, "VALIDATION_ERROR");
                assert_eq!(message, "bad location");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn opaque_error_body_keeps_status_code() {
        match error_for_status(StatusCode::BAD_GATEWAY, "upstream down") {
            YelpError::Api { code, message } => {
                assert_eq!(code, "502");
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
