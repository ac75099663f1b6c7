//! Row structs mapping Diesel query results to domain entities.
//!
//! Status and role columns are stored as text and parsed through the closed
//! domain enums on the way out; photo and tag lists are stored as JSON array
//! strings, matching the wire format.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    ANONYMOUS_AUTHOR, ANONYMOUS_USER, Article, Author, AuthorView, Comment, Company, Error,
    ModerationStatus, Review, User, UserRole,
};

use super::schema::{articles, comments, companies, reviews, users};

/// Parse a stored moderation status, surfacing corrupt rows as 500s.
pub(super) fn parse_status(raw: &str) -> Result<ModerationStatus, Error> {
    raw.parse()
        .map_err(|()| Error::internal(format!("invalid status in storage: {raw}")))
}

/// Parse a stored JSON array of strings; empty input means an empty list.
pub(super) fn parse_string_list(raw: &str) -> Result<Vec<String>, Error> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|err| Error::internal(format!("invalid list in storage: {err}")))
}

/// Encode a string list for storage.
pub(super) fn encode_string_list(values: &[String]) -> Result<String, Error> {
    serde_json::to_string(values)
        .map_err(|err| Error::internal(format!("list encoding failed: {err}")))
}

/// Build the wire author from an optionally joined user row.
pub(super) fn author_view(user: Option<&UserRow>, anonymous: Option<String>, default: &str) -> AuthorView {
    match user {
        Some(user) => AuthorView::registered(user.id, user.name.clone(), user.avatar.clone()),
        None => AuthorView::anonymous(
            anonymous
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| default.to_owned()),
        ),
    }
}

/// Account row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to the domain entity, parsing the role column.
    pub fn into_domain(self) -> Result<User, Error> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|()| Error::internal(format!("invalid role in storage: {}", self.role)))?;
        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            role,
            avatar: self.avatar,
            created_at: self.created_at,
        })
    }
}

/// Insertable account row.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Profile changeset; `None` fields are left unchanged.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Company row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub city: String,
    pub status: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub rating: f64,
    pub review_count: i64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyRow {
    /// Convert to the domain entity, parsing the status column.
    pub fn into_domain(self) -> Result<Company, Error> {
        let status = parse_status(&self.status)?;
        Ok(Company {
            id: self.id,
            name: self.name,
            category: self.category,
            city: self.city,
            status,
            address: self.address,
            phone: self.phone,
            website: self.website,
            description: self.description,
            logo: self.logo,
            rating: self.rating,
            review_count: self.review_count,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable company row.
#[derive(Debug, Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompanyRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub city: String,
    pub status: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub rating: f64,
    pub review_count: i64,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Company changeset; outer `None` skips a column, inner `None` nulls it.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = companies)]
pub struct CompanyChangeset {
    pub name: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub address: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub logo: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Review row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub text: Option<String>,
    pub photos: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewRow {
    /// Convert to the domain entity, parsing status and photo list.
    pub fn into_domain(self) -> Result<Review, Error> {
        let status = parse_status(&self.status)?;
        let photos = parse_string_list(&self.photos)?;
        Ok(Review {
            id: self.id,
            company_id: self.company_id,
            user_id: self.user_id,
            rating: self.rating,
            text: self.text,
            photos,
            status,
            created_at: self.created_at,
        })
    }
}

/// Insertable review row.
#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub text: Option<String>,
    pub photos: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Review changeset; `None` fields are left unchanged.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = reviews)]
pub struct ReviewChangeset {
    pub rating: Option<i32>,
    pub text: Option<Option<String>>,
    pub photos: Option<String>,
}

/// Article row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub tags: String,
    pub status: String,
    pub author_id: Option<Uuid>,
    pub anonymous_author: Option<String>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleRow {
    /// Convert to the domain entity, rebuilding the authorship variant.
    pub fn into_domain(self) -> Result<Article, Error> {
        let status = parse_status(&self.status)?;
        let tags = parse_string_list(&self.tags)?;
        let author = Author::from_columns(self.author_id, self.anonymous_author, ANONYMOUS_AUTHOR);
        Ok(Article {
            id: self.id,
            title: self.title,
            content: self.content,
            excerpt: self.excerpt,
            cover_image: self.cover_image,
            tags,
            status,
            author,
            views: self.views,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insertable article row.
#[derive(Debug, Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticleRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub tags: String,
    pub status: String,
    pub author_id: Option<Uuid>,
    pub anonymous_author: Option<String>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article changeset; outer `None` skips a column, inner `None` nulls it.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = articles)]
pub struct ArticleChangeset {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<Option<String>>,
    pub tags: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Comment row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Option<Uuid>,
    pub anonymous_name: Option<String>,
    pub text: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl CommentRow {
    /// Convert to the domain entity, rebuilding the authorship variant.
    pub fn into_domain(self) -> Result<Comment, Error> {
        let status = parse_status(&self.status)?;
        let author = Author::from_columns(self.user_id, self.anonymous_name, ANONYMOUS_USER);
        Ok(Comment {
            id: self.id,
            article_id: self.article_id,
            author,
            text: self.text,
            status,
            created_at: self.created_at,
        })
    }
}

/// Insertable comment row.
#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewCommentRow {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Option<Uuid>,
    pub anonymous_name: Option<String>,
    pub text: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
