//! Forum articles.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::author::{Author, AuthorView};
use super::comment::CommentView;
use super::moderation::ModerationStatus;

/// Number of content characters kept when deriving an excerpt.
pub const EXCERPT_LENGTH: usize = 200;

/// Derive an excerpt from article content.
///
/// Takes the first [`EXCERPT_LENGTH`] characters (character, not byte,
/// boundary) and appends an ellipsis marker.
pub fn derive_excerpt(content: &str) -> String {
    let mut excerpt: String = content.chars().take(EXCERPT_LENGTH).collect();
    excerpt.push_str("...");
    excerpt
}

/// A forum article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Stable identifier.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Full body.
    pub content: String,
    /// Listing excerpt; derived from the content when not supplied.
    pub excerpt: String,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Ordered tag set.
    pub tags: Vec<String>,
    /// Moderation state; only approved articles appear in public listings.
    pub status: ModerationStatus,
    /// Authenticated or anonymous author.
    pub author: Author,
    /// View counter, incremented on every detail fetch.
    pub views: i64,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Creation payload for an article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    /// Headline.
    pub title: String,
    /// Full body.
    pub content: String,
    /// Explicit excerpt; derived from the content when `None`.
    pub excerpt: Option<String>,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Ordered tag set.
    pub tags: Vec<String>,
    /// Resolved authorship.
    pub author: Author,
    /// Initial moderation state (policy-driven).
    pub status: ModerationStatus,
}

/// Partial article update; `None` fields are left unchanged.
///
/// Changing the content re-derives the excerpt unless an explicit excerpt
/// accompanies it. Status is deliberately absent: transitions go through the
/// admin-gated moderation operation only.
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
    /// New headline.
    pub title: Option<String>,
    /// New body.
    pub content: Option<String>,
    /// Explicit excerpt override.
    pub excerpt: Option<String>,
    /// New cover image URL.
    pub cover_image: Option<Option<String>>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
}

/// Listing projection of an article.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleView {
    /// Stable identifier.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Listing excerpt.
    pub excerpt: String,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Ordered tag set.
    pub tags: Vec<String>,
    /// Moderation state.
    pub status: ModerationStatus,
    /// View counter.
    pub views: i64,
    /// Resolved author.
    pub author: AuthorView,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of comments on the article.
    pub comment_count: i64,
}

/// Detail projection: the full article plus its approved comments.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleDetail {
    /// Stable identifier.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Full body.
    pub content: String,
    /// Listing excerpt.
    pub excerpt: String,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Ordered tag set.
    pub tags: Vec<String>,
    /// Moderation state.
    pub status: ModerationStatus,
    /// View counter, already including this fetch.
    pub views: i64,
    /// Resolved author.
    pub author: AuthorView,
    /// Approved comments, oldest first.
    pub comments: Vec<CommentView>,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Listing filters for the forum endpoint.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// Keep only articles carrying this tag.
    pub tag: Option<String>,
    /// Case-insensitive substring match over title, content, tags, and
    /// excerpt.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn excerpt_truncates_on_character_boundaries() {
        let content = "é".repeat(300);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_LENGTH + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[rstest]
    fn excerpt_of_short_content_keeps_everything() {
        assert_eq!(derive_excerpt("short body"), "short body...");
    }
}
