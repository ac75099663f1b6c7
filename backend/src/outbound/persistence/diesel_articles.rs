//! PostgreSQL-backed `ArticleRepository` using Diesel.
//!
//! Comments cascade away with their article at the schema level. The view
//! counter increments with a plain `views = views + 1` update; exactness
//! under concurrency is explicitly not an invariant.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageInfo, PageRequest};
use uuid::Uuid;

use crate::domain::ports::ArticleRepository;
use crate::domain::{
    ANONYMOUS_AUTHOR, ANONYMOUS_USER, Article, ArticleDetail, ArticleFilter, ArticleUpdate,
    ArticleView, Error, ModerationStatus, NewArticle, derive_excerpt,
};

use super::pool::Db;
use super::rows::{self, ArticleChangeset, ArticleRow, CommentRow, NewArticleRow, UserRow};
use super::schema::{articles, comments, users};
use super::to_i64;

/// Diesel-backed article storage.
#[derive(Clone)]
pub struct DieselArticleRepository {
    db: Db,
}

impl DieselArticleRepository {
    /// Create a repository over the shared pool.
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

/// Apply [`ArticleFilter`] to a boxed articles query.
///
/// Tag containment matches the quoted tag inside the stored JSON array, so
/// `city` does not match a `cityscape` tag.
macro_rules! apply_article_filter {
    ($query:expr, $filter:expr) => {{
        let mut query =
            $query.filter(articles::status.eq(ModerationStatus::Approved.as_str()));
        if let Some(tag) = &$filter.tag {
            query = query.filter(articles::tags.like(format!("%\"{tag}\"%")));
        }
        if let Some(term) = &$filter.search {
            let pattern = format!("%{term}%");
            query = query.filter(
                articles::title
                    .ilike(pattern.clone())
                    .or(articles::content.ilike(pattern.clone()))
                    .or(articles::tags.ilike(pattern.clone()))
                    .or(articles::excerpt.ilike(pattern)),
            );
        }
        query
    }};
}

fn article_view(
    row: ArticleRow,
    user: Option<&UserRow>,
    comment_count: i64,
) -> Result<ArticleView, Error> {
    let status = rows::parse_status(&row.status)?;
    let tags = rows::parse_string_list(&row.tags)?;
    let author = rows::author_view(user, row.anonymous_author, ANONYMOUS_AUTHOR);
    Ok(ArticleView {
        id: row.id,
        title: row.title,
        excerpt: row.excerpt,
        cover_image: row.cover_image,
        tags,
        status,
        views: row.views,
        author,
        created_at: row.created_at,
        comment_count,
    })
}

/// Comment totals per article, for listing payloads.
async fn comment_counts(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i64)> = comments::table
        .filter(comments::article_id.eq_any(ids.to_vec()))
        .group_by(comments::article_id)
        .select((comments::article_id, diesel::dsl::count_star()))
        .load(conn)
        .await?;
    Ok(rows.into_iter().collect())
}

async fn views_for(
    conn: &mut AsyncPgConnection,
    rows: Vec<(ArticleRow, Option<UserRow>)>,
) -> Result<Vec<ArticleView>, Error> {
    let ids: Vec<Uuid> = rows.iter().map(|(article, _)| article.id).collect();
    let counts = comment_counts(conn, &ids).await?;
    rows.into_iter()
        .map(|(article, user)| {
            let count = counts.get(&article.id).copied().unwrap_or(0);
            article_view(article, user.as_ref(), count)
        })
        .collect()
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    async fn list(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<Page<ArticleView>, Error> {
        let mut conn = self.db.conn().await?;

        let count_query = apply_article_filter!(
            articles::table.select(diesel::dsl::count_star()).into_boxed(),
            filter
        );
        let total: i64 = count_query.first(&mut conn).await?;

        let rows_query = apply_article_filter!(
            articles::table
                .left_join(users::table)
                .select((ArticleRow::as_select(), Option::<UserRow>::as_select()))
                .into_boxed(),
            filter
        );
        let rows: Vec<(ArticleRow, Option<UserRow>)> = rows_query
            .order(articles::created_at.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .load(&mut conn)
            .await?;

        let items = views_for(&mut conn, rows).await?;
        Ok(Page {
            items,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }

    async fn detail(&self, id: Uuid) -> Result<Option<ArticleDetail>, Error> {
        let mut conn = self.db.conn().await?;

        let row: Option<ArticleRow> = diesel::update(
            articles::table
                .find(id)
                .filter(articles::status.eq(ModerationStatus::Approved.as_str())),
        )
        .set(articles::views.eq(articles::views + 1))
        .get_result(&mut conn)
        .await
        .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };

        let author: Option<UserRow> = match row.author_id {
            Some(author_id) => users::table
                .find(author_id)
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()?,
            None => None,
        };

        let comment_rows: Vec<(CommentRow, Option<UserRow>)> = comments::table
            .left_join(users::table)
            .filter(comments::article_id.eq(id))
            .filter(comments::status.eq(ModerationStatus::Approved.as_str()))
            .order(comments::created_at.asc())
            .select((CommentRow::as_select(), Option::<UserRow>::as_select()))
            .load(&mut conn)
            .await?;
        let comment_views = comment_rows
            .into_iter()
            .map(|(comment, user)| super::diesel_comments::comment_view(comment, user.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let status = rows::parse_status(&row.status)?;
        let tags = rows::parse_string_list(&row.tags)?;
        let author_view =
            rows::author_view(author.as_ref(), row.anonymous_author.clone(), ANONYMOUS_AUTHOR);
        Ok(Some(ArticleDetail {
            id: row.id,
            title: row.title,
            content: row.content,
            excerpt: row.excerpt,
            cover_image: row.cover_image,
            tags,
            status,
            views: row.views,
            author: author_view,
            comments: comment_views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Article>, Error> {
        let mut conn = self.db.conn().await?;
        let row: Option<ArticleRow> = articles::table
            .find(id)
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(ArticleRow::into_domain).transpose()
    }

    async fn create(&self, article: NewArticle) -> Result<Article, Error> {
        let mut conn = self.db.conn().await?;
        let now = Utc::now();
        let excerpt = article
            .excerpt
            .unwrap_or_else(|| derive_excerpt(&article.content));
        let row = NewArticleRow {
            id: Uuid::new_v4(),
            title: article.title,
            content: article.content,
            excerpt,
            cover_image: article.cover_image,
            tags: rows::encode_string_list(&article.tags)?,
            status: article.status.as_str().to_owned(),
            author_id: article.author.user_id(),
            anonymous_author: article.author.anonymous_name().map(str::to_owned),
            views: 0,
            created_at: now,
            updated_at: now,
        };
        let inserted: ArticleRow = diesel::insert_into(articles::table)
            .values(&row)
            .get_result(&mut conn)
            .await?;
        inserted.into_domain()
    }

    async fn update(&self, id: Uuid, update: ArticleUpdate) -> Result<Article, Error> {
        let mut conn = self.db.conn().await?;

        let excerpt = match (&update.excerpt, &update.content) {
            (Some(explicit), _) => Some(explicit.clone()),
            (None, Some(content)) => Some(derive_excerpt(content)),
            (None, None) => None,
        };
        let tags = update
            .tags
            .as_deref()
            .map(rows::encode_string_list)
            .transpose()?;
        let changeset = ArticleChangeset {
            title: update.title,
            content: update.content,
            excerpt,
            cover_image: update.cover_image,
            tags,
            updated_at: Some(Utc::now()),
        };

        let row: Option<ArticleRow> = diesel::update(articles::table.find(id))
            .set(&changeset)
            .get_result(&mut conn)
            .await
            .optional()?;
        row.ok_or_else(|| Error::not_found("Article not found"))?
            .into_domain()
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut conn = self.db.conn().await?;
        let deleted = diesel::delete(articles::table.find(id))
            .execute(&mut conn)
            .await?;
        if deleted == 0 {
            return Err(Error::not_found("Article not found"));
        }
        Ok(())
    }

    async fn tags(&self) -> Result<Vec<String>, Error> {
        let mut conn = self.db.conn().await?;
        let stored: Vec<String> = articles::table
            .filter(articles::status.eq(ModerationStatus::Approved.as_str()))
            .select(articles::tags)
            .load(&mut conn)
            .await?;
        let mut tags: Vec<String> = Vec::new();
        for raw in stored {
            tags.extend(rows::parse_string_list(&raw)?);
        }
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<ArticleView, Error> {
        let mut conn = self.db.conn().await?;
        let row: Option<ArticleRow> = diesel::update(articles::table.find(id))
            .set((
                articles::status.eq(status.as_str()),
                articles::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)
            .await
            .optional()?;
        let row = row.ok_or_else(|| Error::not_found("Article not found"))?;

        let author: Option<UserRow> = match row.author_id {
            Some(author_id) => users::table
                .find(author_id)
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()?,
            None => None,
        };
        let counts = comment_counts(&mut conn, &[row.id]).await?;
        let count = counts.get(&row.id).copied().unwrap_or(0);
        article_view(row, author.as_ref(), count)
    }

    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<ArticleView>, Error> {
        let mut conn = self.db.conn().await?;

        let total: i64 = articles::table
            .filter(articles::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await?;

        let rows: Vec<(ArticleRow, Option<UserRow>)> = articles::table
            .left_join(users::table)
            .filter(articles::status.eq(status.as_str()))
            .order(articles::created_at.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .select((ArticleRow::as_select(), Option::<UserRow>::as_select()))
            .load(&mut conn)
            .await?;

        let items = views_for(&mut conn, rows).await?;
        Ok(Page {
            items,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<ArticleView>, Error> {
        let filter = ArticleFilter {
            tag: None,
            search: Some(term.to_owned()),
        };
        self.list(&filter, page).await
    }

    async fn titles_matching(&self, term: &str, limit: u32) -> Result<Vec<ArticleView>, Error> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<(ArticleRow, Option<UserRow>)> = articles::table
            .left_join(users::table)
            .filter(articles::status.eq(ModerationStatus::Approved.as_str()))
            .filter(articles::title.ilike(format!("%{term}%")))
            .order(articles::title.asc())
            .limit(i64::from(limit))
            .select((ArticleRow::as_select(), Option::<UserRow>::as_select()))
            .load(&mut conn)
            .await?;
        views_for(&mut conn, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn article_view_resolves_anonymous_authors() {
        let row = ArticleRow {
            id: Uuid::new_v4(),
            title: "Hidden corners".to_owned(),
            content: "body".to_owned(),
            excerpt: "body...".to_owned(),
            cover_image: None,
            tags: "[\"city\"]".to_owned(),
            status: "approved".to_owned(),
            author_id: None,
            anonymous_author: Some("Drifter".to_owned()),
            views: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let view = article_view(row, None, 2).expect("view builds");
        assert_eq!(view.author.name, "Drifter");
        assert_eq!(view.author.id, None);
        assert_eq!(view.comment_count, 2);
        assert_eq!(view.tags, vec!["city".to_owned()]);
    }

    #[rstest]
    fn article_view_defaults_missing_anonymous_names() {
        let row = ArticleRow {
            id: Uuid::new_v4(),
            title: "Untitled".to_owned(),
            content: "body".to_owned(),
            excerpt: "body...".to_owned(),
            cover_image: None,
            tags: "[]".to_owned(),
            status: "approved".to_owned(),
            author_id: None,
            anonymous_author: None,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let view = article_view(row, None, 0).expect("view builds");
        assert_eq!(view.author.name, ANONYMOUS_AUTHOR);
    }
}
