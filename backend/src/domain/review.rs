//! Star-rated reviews of companies.
//!
//! Reviews always belong to a registered author: creation requires
//! authentication, which is what makes the one-review-per-user constraint
//! enforceable. At most one review may exist per `(company, author)` pair.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::author::AuthorView;
use super::company::CompanySummary;
use super::moderation::ModerationStatus;

/// A review row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Stable identifier.
    pub id: Uuid,
    /// Reviewed company.
    pub company_id: Uuid,
    /// Authoring user.
    pub user_id: Uuid,
    /// Star rating, 1 to 5.
    pub rating: i32,
    /// Free-text body.
    pub text: Option<String>,
    /// Ordered photo URLs attached to the review.
    pub photos: Vec<String>,
    /// Moderation state; only approved reviews count towards the aggregate.
    pub status: ModerationStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    /// Reviewed company.
    pub company_id: Uuid,
    /// Authoring user.
    pub user_id: Uuid,
    /// Star rating, 1 to 5.
    pub rating: i32,
    /// Free-text body.
    pub text: Option<String>,
    /// Ordered photo URLs.
    pub photos: Vec<String>,
    /// Initial moderation state (policy-driven).
    pub status: ModerationStatus,
}

/// Partial review update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ReviewUpdate {
    /// New star rating.
    pub rating: Option<i32>,
    /// New body text.
    pub text: Option<Option<String>>,
    /// Replacement photo list.
    pub photos: Option<Vec<String>>,
}

/// Wire projection of a review with its resolved author.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewView {
    /// Stable identifier.
    pub id: Uuid,
    /// Star rating.
    pub rating: i32,
    /// Free-text body.
    pub text: Option<String>,
    /// Ordered photo URLs.
    pub photos: Vec<String>,
    /// Moderation state.
    pub status: ModerationStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Resolved author.
    pub author: AuthorView,
    /// Company summary, populated by per-user listings and detail fetches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanySummary>,
}
