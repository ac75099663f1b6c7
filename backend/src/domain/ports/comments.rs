//! Comment storage port.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::comment::{Comment, CommentView, NewComment};
use crate::domain::error::Error;
use crate::domain::moderation::ModerationStatus;

/// Durable storage for article comments.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a comment; fails with not-found when the article is missing.
    async fn create(&self, comment: NewComment) -> Result<CommentView, Error>;

    /// Fetch the raw row regardless of status (authorization checks).
    async fn get(&self, id: Uuid) -> Result<Option<Comment>, Error>;

    /// Fetch one comment with its resolved author.
    async fn view(&self, id: Uuid) -> Result<Option<CommentView>, Error>;

    /// Replace the comment body and return the fresh view.
    async fn update_text(&self, id: Uuid, text: String) -> Result<CommentView, Error>;

    /// Delete a comment.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;

    /// Moderation transition.
    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<CommentView, Error>;

    /// Moderation queue: comments in `status`, newest first.
    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<CommentView>, Error>;
}
