//! Review storage port.
//!
//! Every mutating operation here is also a rating-aggregation trigger: the
//! adapter recomputes the owning company's aggregate from the full approved
//! review set inside the same transaction as the write, so callers never
//! observe a company row inconsistent with its reviews.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::moderation::ModerationStatus;
use crate::domain::review::{NewReview, Review, ReviewUpdate, ReviewView};

/// Durable storage for reviews.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Create a review.
    ///
    /// Fails with not-found when the company does not exist and with a
    /// conflict when the author already reviewed it.
    async fn create(&self, review: NewReview) -> Result<ReviewView, Error>;

    /// Fetch the raw row regardless of status (authorization checks).
    async fn get(&self, id: Uuid) -> Result<Option<Review>, Error>;

    /// Fetch one review with author and company summary.
    async fn view(&self, id: Uuid) -> Result<Option<ReviewView>, Error>;

    /// Apply a partial update, recomputing the company aggregate.
    async fn update(&self, id: Uuid, update: ReviewUpdate) -> Result<ReviewView, Error>;

    /// Delete a review, recomputing the company aggregate.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;

    /// Approved reviews of one company, newest first.
    async fn list_for_company(
        &self,
        company_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error>;

    /// All reviews authored by one user (any status), newest first, with
    /// company summaries.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error>;

    /// Moderation transition; recomputes the company aggregate in the same
    /// transaction as the status write.
    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<ReviewView, Error>;

    /// Moderation queue: reviews in `status`, newest first.
    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error>;

    /// Approved reviews whose text matches `term`, newest first.
    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<ReviewView>, Error>;
}
