//! Business Records and Selection
//!
//! The normalized venue record delivered to observers, and the pure
//! filter/sort stage that turns a provider result list into the emission
//! sequence.
//!
//! # Selection
//!
//! 1. Keep records rated strictly above the threshold with more than
//!    [`MIN_REVIEW_COUNT`] reviews.
//! 2. Stable-sort by [`price_rank`]: absent price first, then by the length
//!    of the price string. Only the length is compared, never the symbols.
//! 3. Keep records in the cheapest tier (price length of exactly one).

use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Review count a business must strictly exceed to be selected.
pub const MIN_REVIEW_COUNT: u32 = 200;

/// Price string length of the cheapest tier (`$`).
pub const CHEAPEST_PRICE_TIER_LEN: usize = 1;

/// Rank assigned to a business without a price tier.
pub const UNPRICED_RANK: i64 = -1;

// =============================================================================
// Business
// =============================================================================

/// A venue listing as seen by observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    /// Display name.
    pub name: String,
    /// Coarse price tier such as `$` or `$$`.
    pub price: Option<String>,
    /// Average rating (provider range 0-5).
    pub rating: f64,
    /// Number of reviews.
    pub review_count: u32,
}

impl Business {
    /// Create a business record.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        price: Option<&str>,
        rating: f64,
        review_count: u32,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.map(str::to_string),
            rating,
            review_count,
        }
    }

    /// Price tier, if the provider reported one.
    #[must_use]
    pub fn price(&self) -> Option<&str> {
        self.price.as_deref()
    }

    /// Ordering key derived from the price tier.
    #[must_use]
    pub fn price_rank(&self) -> i64 {
        price_rank(self.price())
    }

    /// Whether the business is in the cheapest price tier.
    #[must_use]
    pub fn is_cheapest_tier(&self) -> bool {
        self.price()
            .is_some_and(|p| p.chars().count() == CHEAPEST_PRICE_TIER_LEN)
    }

    fn is_well_reviewed(&self, rating_threshold: f64) -> bool {
        self.rating > rating_threshold && self.review_count > MIN_REVIEW_COUNT
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Rank a price tier for sorting.
///
/// An absent tier ranks [`UNPRICED_RANK`]; otherwise the rank is the
/// character length of the tier string.
#[must_use]
pub fn price_rank(price: Option<&str>) -> i64 {
    price.map_or(UNPRICED_RANK, |p| {
        i64::try_from(p.chars().count()).unwrap_or(i64::MAX)
    })
}

/// Narrow and order provider candidates into the emission sequence.
///
/// Pure and synchronous. The returned order is the order observers see.
#[must_use]
pub fn select_cheapest(candidates: Vec<Business>, rating_threshold: f64) -> Vec<Business> {
    let mut kept: Vec<Business> = candidates
        .into_iter()
        .filter(|b| b.is_well_reviewed(rating_threshold))
        .collect();

    // `sort_by_key` is stable, ties keep provider order.
    kept.sort_by_key(Business::price_rank);

    kept.retain(Business::is_cheapest_tier);
    kept
}

// =============================================================================
// Tests
// =============================================================================
