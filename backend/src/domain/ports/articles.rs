//! Article storage port.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::article::{
    Article, ArticleDetail, ArticleFilter, ArticleUpdate, ArticleView, NewArticle,
};
use crate::domain::error::Error;
use crate::domain::moderation::ModerationStatus;

/// Durable storage for forum articles.
///
/// Deleting an article cascades to its comments.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Approved articles, newest first, filtered per [`ArticleFilter`].
    async fn list(&self, filter: &ArticleFilter, page: PageRequest)
    -> Result<Page<ArticleView>, Error>;

    /// Fetch one approved article with its approved comments (oldest first),
    /// incrementing the view counter.
    ///
    /// The increment is deliberately unguarded; view counts are not a
    /// correctness invariant.
    async fn detail(&self, id: Uuid) -> Result<Option<ArticleDetail>, Error>;

    /// Fetch the raw row regardless of status (authorization checks).
    async fn get(&self, id: Uuid) -> Result<Option<Article>, Error>;

    /// Create an article.
    async fn create(&self, article: NewArticle) -> Result<Article, Error>;

    /// Apply a partial update and return the fresh row.
    async fn update(&self, id: Uuid, update: ArticleUpdate) -> Result<Article, Error>;

    /// Delete an article and all of its comments.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;

    /// Distinct sorted tags across approved articles.
    async fn tags(&self) -> Result<Vec<String>, Error>;

    /// Moderation transition; writes status and `updated_at`.
    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<ArticleView, Error>;

    /// Moderation queue: articles in `status`, newest first.
    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<ArticleView>, Error>;

    /// Approved articles matching `term` over title, content, tags, and
    /// excerpt, newest first.
    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<ArticleView>, Error>;

    /// Approved articles whose title matches `term`, for autocomplete.
    async fn titles_matching(&self, term: &str, limit: u32) -> Result<Vec<ArticleView>, Error>;
}
