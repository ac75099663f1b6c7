//! Authorship model shared by reviews, articles, and comments.
//!
//! Content is attributed either to a registered user or to a free-text
//! display name, never both. The variant is resolved once at creation time
//! ([`Author::resolve`]) and stored as discriminated columns; a user
//! reference always takes precedence when both happen to be populated.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Fallback display name for anonymous comments and reviews.
pub const ANONYMOUS_USER: &str = "Anonymous user";

/// Fallback display name for anonymous article authors.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous author";

/// Resolved authorship of a piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
    /// Content bound to a registered user.
    Authenticated(Uuid),
    /// Content attributed to a free-text display name.
    Anonymous(String),
}

impl Author {
    /// Resolve authorship for a creation request.
    ///
    /// An authenticated identity wins outright: any anonymous name in the
    /// payload is ignored. Without one, the payload name is used, falling
    /// back to `default` when absent or blank. This never fails; a missing
    /// identity is a normal branch, not an error.
    pub fn resolve(user_id: Option<Uuid>, payload_name: Option<&str>, default: &str) -> Self {
        match user_id {
            Some(id) => Self::Authenticated(id),
            None => {
                let name = payload_name
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(default);
                Self::Anonymous(name.to_owned())
            }
        }
    }

    /// Rebuild the variant from its storage columns.
    ///
    /// A non-null user id takes precedence over a stored anonymous name;
    /// rows with neither fall back to `default`.
    pub fn from_columns(
        user_id: Option<Uuid>,
        anonymous_name: Option<String>,
        default: &str,
    ) -> Self {
        match user_id {
            Some(id) => Self::Authenticated(id),
            None => Self::Anonymous(
                anonymous_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| default.to_owned()),
            ),
        }
    }

    /// User id column value for this authorship.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Authenticated(id) => Some(*id),
            Self::Anonymous(_) => None,
        }
    }

    /// Anonymous-name column value for this authorship.
    pub fn anonymous_name(&self) -> Option<&str> {
        match self {
            Self::Authenticated(_) => None,
            Self::Anonymous(name) => Some(name),
        }
    }
}

/// Wire representation of an author, embedded in content payloads.
///
/// Anonymous authors carry `id: null` and no avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorView {
    /// Registered user id, `null` for anonymous content.
    pub id: Option<Uuid>,
    /// Display name shown next to the content.
    pub name: String,
    /// Avatar URL of the registered user, if any.
    pub avatar: Option<String>,
}

impl AuthorView {
    /// View for an anonymous author.
    pub fn anonymous(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            avatar: None,
        }
    }

    /// View for a registered user.
    pub fn registered(id: Uuid, name: impl Into<String>, avatar: Option<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn authenticated_identity_ignores_payload_name() {
        let id = Uuid::new_v4();
        let author = Author::resolve(Some(id), Some("Impostor"), ANONYMOUS_USER);
        assert_eq!(author, Author::Authenticated(id));
        assert_eq!(author.user_id(), Some(id));
        assert_eq!(author.anonymous_name(), None);
    }

    #[rstest]
    #[case(Some("Casey"), "Casey")]
    #[case(Some("  Casey  "), "Casey")]
    #[case(Some("   "), ANONYMOUS_USER)]
    #[case(None, ANONYMOUS_USER)]
    fn anonymous_name_falls_back_to_default(#[case] payload: Option<&str>, #[case] expected: &str) {
        let author = Author::resolve(None, payload, ANONYMOUS_USER);
        assert_eq!(author, Author::Anonymous(expected.to_owned()));
    }

    #[rstest]
    fn from_columns_prefers_the_user_reference() {
        let id = Uuid::new_v4();
        let author = Author::from_columns(Some(id), Some("stale name".to_owned()), ANONYMOUS_AUTHOR);
        assert_eq!(author, Author::Authenticated(id));
    }

    #[rstest]
    fn from_columns_defaults_blank_names() {
        let author = Author::from_columns(None, Some(String::new()), ANONYMOUS_AUTHOR);
        assert_eq!(author, Author::Anonymous(ANONYMOUS_AUTHOR.to_owned()));
    }
}
