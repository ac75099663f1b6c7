//! Company listings: the directory's central aggregate.
//!
//! `rating` and `review_count` are derived values owned by the rating
//! aggregation engine; nothing outside the review repositories may write
//! them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::moderation::ModerationStatus;
use super::review::ReviewView;
use super::user::UserSummary;

/// A listed business.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Company {
    /// Stable identifier.
    pub id: Uuid,
    /// Business name.
    pub name: String,
    /// Directory category facet.
    pub category: String,
    /// City facet.
    pub city: String,
    /// Moderation state; only approved companies appear in public listings.
    pub status: ModerationStatus,
    /// Street address.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Logo image URL.
    pub logo: Option<String>,
    /// Derived mean of approved review ratings.
    pub rating: f64,
    /// Derived count of approved reviews.
    pub review_count: i64,
    /// Owning user; the only non-admin allowed to modify the listing.
    pub owner_id: Uuid,
    /// Listing creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for a company listing.
#[derive(Debug, Clone)]
pub struct NewCompany {
    /// Business name.
    pub name: String,
    /// Directory category facet.
    pub category: String,
    /// City facet.
    pub city: String,
    /// Street address.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Logo image URL.
    pub logo: Option<String>,
    /// Owning user.
    pub owner_id: Uuid,
    /// Initial moderation state (policy-driven, normally pending).
    pub status: ModerationStatus,
}

/// Partial company update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CompanyUpdate {
    /// New business name.
    pub name: Option<String>,
    /// New category facet.
    pub category: Option<String>,
    /// New city facet.
    pub city: Option<String>,
    /// New street address.
    pub address: Option<Option<String>>,
    /// New contact phone number.
    pub phone: Option<Option<String>>,
    /// New website URL.
    pub website: Option<Option<String>>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New logo URL.
    pub logo: Option<Option<String>>,
}

/// Listing filters for the catalog endpoint.
///
/// `owner_id` switches the listing into "my companies" mode, which shows all
/// of that owner's listings regardless of status; every other mode serves
/// approved companies only.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Exact city match.
    pub city: Option<String>,
    /// Case-insensitive substring match over name, category, city, and
    /// description.
    pub search: Option<String>,
    /// Minimum aggregate rating.
    pub min_rating: Option<f64>,
    /// Restrict to one owner's listings (all statuses).
    pub owner_id: Option<Uuid>,
}

/// Company detail payload: the listing plus its owner and latest reviews.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyDetail {
    /// The listing itself.
    #[serde(flatten)]
    pub company: Company,
    /// Owner summary, when the owning account still exists.
    pub owner: Option<UserSummary>,
    /// Latest approved reviews (at most ten, newest first).
    pub reviews: Vec<ReviewView>,
}

/// Short company projection embedded in review payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CompanySummary {
    /// Stable identifier.
    pub id: Uuid,
    /// Business name.
    pub name: String,
    /// Directory category facet.
    pub category: String,
}
