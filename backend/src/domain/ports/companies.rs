//! Company storage port.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::company::{Company, CompanyDetail, CompanyFilter, CompanyUpdate, NewCompany};
use crate::domain::error::Error;
use crate::domain::moderation::ModerationStatus;

/// Durable storage for company listings.
///
/// Deleting a company cascades to its reviews; the moderation transition
/// touches `updated_at` alongside the status column.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// List companies ordered by rating, filtered per [`CompanyFilter`].
    ///
    /// Without an owner filter only approved listings are served.
    async fn list(&self, filter: &CompanyFilter, page: PageRequest) -> Result<Page<Company>, Error>;

    /// Fetch one approved company with its owner summary and latest approved
    /// reviews (at most ten, newest first).
    async fn detail(&self, id: Uuid) -> Result<Option<CompanyDetail>, Error>;

    /// Fetch the raw row regardless of status (authorization checks).
    async fn get(&self, id: Uuid) -> Result<Option<Company>, Error>;

    /// Create a listing.
    async fn create(&self, company: NewCompany) -> Result<Company, Error>;

    /// Apply a partial update and return the fresh row.
    async fn update(&self, id: Uuid, update: CompanyUpdate) -> Result<Company, Error>;

    /// Delete a listing and all of its reviews.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;

    /// Distinct category facet values across all listings.
    async fn categories(&self) -> Result<Vec<String>, Error>;

    /// Distinct city facet values across all listings.
    async fn cities(&self) -> Result<Vec<String>, Error>;

    /// Moderation transition; writes status and `updated_at`.
    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<Company, Error>;

    /// Moderation queue: listings in `status`, newest first.
    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<Company>, Error>;

    /// Approved companies whose name matches `term`, for autocomplete.
    async fn names_matching(&self, term: &str, limit: u32) -> Result<Vec<Company>, Error>;

    /// Distinct categories of approved companies matching `term`.
    async fn categories_matching(&self, term: &str, limit: u32) -> Result<Vec<String>, Error>;

    /// Distinct cities of approved companies matching `term`.
    async fn cities_matching(&self, term: &str, limit: u32) -> Result<Vec<String>, Error>;
}
