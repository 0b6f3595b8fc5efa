//! Yelp Fusion API response types.
//!
//! Only the fields the pipeline consumes are modelled; everything else in
//! the provider payload is ignored.

use serde::Deserialize;

use crate::domain::business::Business;

/// Response body of `GET /businesses/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct YelpSearchResponse {
    /// Matching businesses in provider order.
    #[serde(default)]
    pub businesses: Vec<YelpBusiness>,
    /// Total matches reported by the provider.
    #[serde(default)]
    pub total: u64,
}

/// One business entry of a search response.
///
/// Every field may be absent or `null` in provider payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct YelpBusiness {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Price tier (`$` .. `$$$$`), omitted for unpriced businesses.
    #[serde(default)]
    pub price: Option<String>,
    /// Average rating.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Number of reviews.
    #[serde(default)]
    pub review_count: Option<u32>,
}

impl YelpBusiness {
    /// Convert to a domain business.
    ///
    /// Returns `None` for entries without a non-blank name. A missing rating
    /// or review count becomes zero.
    #[must_use]
    pub fn into_business(self) -> Option<Business> {
        let name = self.name.filter(|name| !name.trim().is_empty())?;
        Some(Business {
            name,
            price: self.price,
            rating: self.rating.unwrap_or_default(),
            review_count: self.review_count.unwrap_or_default(),
        })
    }
}

/// Error envelope returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct YelpErrorResponse {
    /// Error details.
    pub error: YelpErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct YelpErrorBody {
    /// Machine-readable code, e.g. `VALIDATION_ERROR`.
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}
