//! Rating aggregation for company review sets.
//!
//! The aggregate is always re-derived from the full approved review set of
//! the affected company, never maintained incrementally. Repositories call
//! [`aggregate`] inside the same transaction as the triggering review write,
//! so a company row is never observable with a stale rating.

use super::error::Error;

/// Lowest star rating a review may carry.
pub const MIN_RATING: i32 = 1;

/// Highest star rating a review may carry.
pub const MAX_RATING: i32 = 5;

/// Derived rating state for a company.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Arithmetic mean of the approved review ratings, `0.0` when none.
    pub rating: f64,
    /// Number of approved reviews.
    pub review_count: i64,
}

impl RatingSummary {
    /// Summary of a company with no approved reviews.
    pub const EMPTY: Self = Self {
        rating: 0.0,
        review_count: 0,
    };
}

/// Recompute a company's aggregate from the ratings of its approved reviews.
pub fn aggregate(ratings: &[i32]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary::EMPTY;
    }
    let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    RatingSummary {
        rating: total as f64 / ratings.len() as f64,
        review_count: ratings.len() as i64,
    }
}

/// Validate a caller-supplied star rating.
pub fn validate(rating: i32) -> Result<(), Error> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(Error::invalid_request("rating must be between 1 and 5"))
    }
}
