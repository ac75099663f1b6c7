//! Comments attached to forum articles.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::author::{Author, AuthorView};
use super::moderation::ModerationStatus;

/// A comment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Stable identifier.
    pub id: Uuid,
    /// Commented article.
    pub article_id: Uuid,
    /// Authenticated or anonymous author.
    pub author: Author,
    /// Comment body.
    pub text: String,
    /// Moderation state; only approved comments are served to non-owners.
    pub status: ModerationStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// Creation payload for a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Commented article.
    pub article_id: Uuid,
    /// Resolved authorship.
    pub author: Author,
    /// Comment body.
    pub text: String,
    /// Initial moderation state (policy-driven).
    pub status: ModerationStatus,
}

/// Wire projection of a comment with its resolved author.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentView {
    /// Stable identifier.
    pub id: Uuid,
    /// Comment body.
    pub text: String,
    /// Moderation state.
    pub status: ModerationStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Resolved author.
    pub author: AuthorView,
}
