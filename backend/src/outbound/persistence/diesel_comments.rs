//! PostgreSQL-backed `CommentRepository` using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageInfo, PageRequest};
use uuid::Uuid;

use crate::domain::ports::CommentRepository;
use crate::domain::{ANONYMOUS_USER, Comment, CommentView, Error, ModerationStatus, NewComment};

use super::pool::Db;
use super::rows::{self, CommentRow, NewCommentRow, UserRow};
use super::schema::{articles, comments, users};
use super::to_i64;

/// Diesel-backed comment storage.
#[derive(Clone)]
pub struct DieselCommentRepository {
    db: Db,
}

impl DieselCommentRepository {
    /// Create a repository over the shared pool.
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

/// Assemble the wire view of a comment from its joined rows.
pub(super) fn comment_view(row: CommentRow, user: Option<&UserRow>) -> Result<CommentView, Error> {
    let status = rows::parse_status(&row.status)?;
    let author = rows::author_view(user, row.anonymous_name, ANONYMOUS_USER);
    Ok(CommentView {
        id: row.id,
        text: row.text,
        status,
        created_at: row.created_at,
        author,
    })
}

async fn load_view(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Option<CommentView>, Error> {
    let row: Option<(CommentRow, Option<UserRow>)> = comments::table
        .left_join(users::table)
        .filter(comments::id.eq(id))
        .select((CommentRow::as_select(), Option::<UserRow>::as_select()))
        .first(conn)
        .await
        .optional()?;
    row.map(|(comment, user)| comment_view(comment, user.as_ref()))
        .transpose()
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn create(&self, comment: NewComment) -> Result<CommentView, Error> {
        let mut conn = self.db.conn().await?;

        let article_exists: i64 = articles::table
            .filter(articles::id.eq(comment.article_id))
            .count()
            .get_result(&mut conn)
            .await?;
        if article_exists == 0 {
            return Err(Error::not_found("Article not found"));
        }

        let row = NewCommentRow {
            id: Uuid::new_v4(),
            article_id: comment.article_id,
            user_id: comment.author.user_id(),
            anonymous_name: comment.author.anonymous_name().map(str::to_owned),
            text: comment.text,
            status: comment.status.as_str().to_owned(),
            created_at: Utc::now(),
        };
        let inserted: CommentRow = diesel::insert_into(comments::table)
            .values(&row)
            .get_result(&mut conn)
            .await?;

        let user: Option<UserRow> = match inserted.user_id {
            Some(user_id) => users::table
                .find(user_id)
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()?,
            None => None,
        };
        comment_view(inserted, user.as_ref())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, Error> {
        let mut conn = self.db.conn().await?;
        let row: Option<CommentRow> = comments::table
            .find(id)
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(CommentRow::into_domain).transpose()
    }

    async fn view(&self, id: Uuid) -> Result<Option<CommentView>, Error> {
        let mut conn = self.db.conn().await?;
        load_view(&mut conn, id).await
    }

    async fn update_text(&self, id: Uuid, text: String) -> Result<CommentView, Error> {
        let mut conn = self.db.conn().await?;
        let updated = diesel::update(comments::table.find(id))
            .set(comments::text.eq(text))
            .execute(&mut conn)
            .await?;
        if updated == 0 {
            return Err(Error::not_found("Comment not found"));
        }
        load_view(&mut conn, id)
            .await?
            .ok_or_else(|| Error::internal("comment vanished during update"))
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut conn = self.db.conn().await?;
        let deleted = diesel::delete(comments::table.find(id))
            .execute(&mut conn)
            .await?;
        if deleted == 0 {
            return Err(Error::not_found("Comment not found"));
        }
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<CommentView, Error> {
        let mut conn = self.db.conn().await?;
        let updated = diesel::update(comments::table.find(id))
            .set(comments::status.eq(status.as_str()))
            .execute(&mut conn)
            .await?;
        if updated == 0 {
            return Err(Error::not_found("Comment not found"));
        }
        load_view(&mut conn, id)
            .await?
            .ok_or_else(|| Error::internal("comment vanished during moderation"))
    }

    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<CommentView>, Error> {
        let mut conn = self.db.conn().await?;

        let total: i64 = comments::table
            .filter(comments::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await?;

        let rows: Vec<(CommentRow, Option<UserRow>)> = comments::table
            .left_join(users::table)
            .filter(comments::status.eq(status.as_str()))
            .order(comments::created_at.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .select((CommentRow::as_select(), Option::<UserRow>::as_select()))
            .load(&mut conn)
            .await?;

        let items = rows
            .into_iter()
            .map(|(comment, user)| comment_view(comment, user.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }
}
