//! PostgreSQL-backed `ReviewRepository` using Diesel.
//!
//! Every mutation runs in one transaction together with the rating
//! recomputation for the owning company, so the aggregate can never be
//! observed stale. The recomputation always re-derives from the full
//! approved set via [`rating::aggregate`]; nothing here is incremental.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageInfo, PageRequest};
use uuid::Uuid;

use crate::domain::ports::ReviewRepository;
use crate::domain::{
    ANONYMOUS_USER, CompanySummary, Error, ModerationStatus, NewReview, Review, ReviewUpdate,
    ReviewView, rating,
};

use super::pool::Db;
use super::rows::{self, CompanyRow, NewReviewRow, ReviewChangeset, ReviewRow, UserRow};
use super::schema::{companies, reviews, users};
use super::to_i64;

/// Diesel-backed review storage and rating-aggregation trigger.
#[derive(Clone)]
pub struct DieselReviewRepository {
    db: Db,
}

impl DieselReviewRepository {
    /// Create a repository over the shared pool.
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

/// Assemble the wire view of a review from its joined rows.
pub(super) fn review_view(
    row: ReviewRow,
    user: Option<&UserRow>,
    company: Option<CompanySummary>,
) -> Result<ReviewView, Error> {
    let author = rows::author_view(user, None, ANONYMOUS_USER);
    let status = rows::parse_status(&row.status)?;
    let photos = rows::parse_string_list(&row.photos)?;
    Ok(ReviewView {
        id: row.id,
        rating: row.rating,
        text: row.text,
        photos,
        status,
        created_at: row.created_at,
        author,
        company,
    })
}

fn company_summary(row: &CompanyRow) -> CompanySummary {
    CompanySummary {
        id: row.id,
        name: row.name.clone(),
        category: row.category.clone(),
    }
}

/// Re-derive one company's aggregate from its approved reviews.
///
/// Must run inside the transaction of the triggering write.
async fn recompute_company_rating(
    conn: &mut AsyncPgConnection,
    company_id: Uuid,
) -> Result<(), Error> {
    let ratings: Vec<i32> = reviews::table
        .filter(reviews::company_id.eq(company_id))
        .filter(reviews::status.eq(ModerationStatus::Approved.as_str()))
        .select(reviews::rating)
        .load(conn)
        .await?;
    let summary = rating::aggregate(&ratings);
    diesel::update(companies::table.find(company_id))
        .set((
            companies::rating.eq(summary.rating),
            companies::review_count.eq(summary.review_count),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

async fn load_view_with_company(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<ReviewView>, Error> {
    let row: Option<(ReviewRow, UserRow, CompanyRow)> = reviews::table
        .inner_join(users::table)
        .inner_join(companies::table)
        .filter(reviews::id.eq(id))
        .select((
            ReviewRow::as_select(),
            UserRow::as_select(),
            CompanyRow::as_select(),
        ))
        .first(conn)
        .await
        .optional()?;
    row.map(|(review, user, company)| {
        review_view(review, Some(&user), Some(company_summary(&company)))
    })
    .transpose()
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn create(&self, review: NewReview) -> Result<ReviewView, Error> {
        let mut conn = self.db.conn().await?;
        conn.transaction::<ReviewView, Error, _>(|conn| {
            async move {
                let company_exists: i64 = companies::table
                    .filter(companies::id.eq(review.company_id))
                    .count()
                    .get_result(conn)
                    .await?;
                if company_exists == 0 {
                    return Err(Error::not_found("Company not found"));
                }

                let duplicate: i64 = reviews::table
                    .filter(reviews::company_id.eq(review.company_id))
                    .filter(reviews::user_id.eq(review.user_id))
                    .count()
                    .get_result(conn)
                    .await?;
                if duplicate > 0 {
                    return Err(Error::conflict("You have already reviewed this company"));
                }

                let row = NewReviewRow {
                    id: Uuid::new_v4(),
                    company_id: review.company_id,
                    user_id: review.user_id,
                    rating: review.rating,
                    text: review.text,
                    photos: rows::encode_string_list(&review.photos)?,
                    status: review.status.as_str().to_owned(),
                    created_at: Utc::now(),
                };
                let inserted: ReviewRow = diesel::insert_into(reviews::table)
                    .values(&row)
                    .get_result(conn)
                    .await?;

                recompute_company_rating(conn, inserted.company_id).await?;

                let user: UserRow = users::table
                    .find(inserted.user_id)
                    .select(UserRow::as_select())
                    .first(conn)
                    .await?;
                review_view(inserted, Some(&user), None)
            }
            .scope_boxed()
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Review>, Error> {
        let mut conn = self.db.conn().await?;
        let row: Option<ReviewRow> = reviews::table
            .find(id)
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(ReviewRow::into_domain).transpose()
    }

    async fn view(&self, id: Uuid) -> Result<Option<ReviewView>, Error> {
        let mut conn = self.db.conn().await?;
        load_view_with_company(&mut conn, id).await
    }

    async fn update(&self, id: Uuid, update: ReviewUpdate) -> Result<ReviewView, Error> {
        let mut conn = self.db.conn().await?;
        conn.transaction::<ReviewView, Error, _>(|conn| {
            async move {
                let photos = update
                    .photos
                    .as_deref()
                    .map(rows::encode_string_list)
                    .transpose()?;
                let changeset = ReviewChangeset {
                    rating: update.rating,
                    text: update.text,
                    photos,
                };

                let row: ReviewRow = if changeset.rating.is_none()
                    && changeset.text.is_none()
                    && changeset.photos.is_none()
                {
                    reviews::table
                        .find(id)
                        .select(ReviewRow::as_select())
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| Error::not_found("Review not found"))?
                } else {
                    diesel::update(reviews::table.find(id))
                        .set(&changeset)
                        .get_result(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| Error::not_found("Review not found"))?
                };

                recompute_company_rating(conn, row.company_id).await?;
                load_view_with_company(conn, row.id)
                    .await?
                    .ok_or_else(|| Error::internal("review vanished during update"))
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut conn = self.db.conn().await?;
        conn.transaction::<(), Error, _>(|conn| {
            async move {
                let deleted: Option<ReviewRow> = diesel::delete(reviews::table.find(id))
                    .get_result(conn)
                    .await
                    .optional()?;
                let row = deleted.ok_or_else(|| Error::not_found("Review not found"))?;
                recompute_company_rating(conn, row.company_id).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_for_company(
        &self,
        company_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error> {
        let mut conn = self.db.conn().await?;

        let total: i64 = reviews::table
            .filter(reviews::company_id.eq(company_id))
            .filter(reviews::status.eq(ModerationStatus::Approved.as_str()))
            .count()
            .get_result(&mut conn)
            .await?;

        let rows: Vec<(ReviewRow, UserRow)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::company_id.eq(company_id))
            .filter(reviews::status.eq(ModerationStatus::Approved.as_str()))
            .order(reviews::created_at.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .select((ReviewRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await?;

        let items = rows
            .into_iter()
            .map(|(review, user)| review_view(review, Some(&user), None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error> {
        let mut conn = self.db.conn().await?;

        let total: i64 = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .await?;

        let rows: Vec<(ReviewRow, UserRow, CompanyRow)> = reviews::table
            .inner_join(users::table)
            .inner_join(companies::table)
            .filter(reviews::user_id.eq(user_id))
            .order(reviews::created_at.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .select((
                ReviewRow::as_select(),
                UserRow::as_select(),
                CompanyRow::as_select(),
            ))
            .load(&mut conn)
            .await?;

        let items = rows
            .into_iter()
            .map(|(review, user, company)| {
                review_view(review, Some(&user), Some(company_summary(&company)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<ReviewView, Error> {
        let mut conn = self.db.conn().await?;
        conn.transaction::<ReviewView, Error, _>(|conn| {
            async move {
                let row: Option<ReviewRow> = diesel::update(reviews::table.find(id))
                    .set(reviews::status.eq(status.as_str()))
                    .get_result(conn)
                    .await
                    .optional()?;
                let row = row.ok_or_else(|| Error::not_found("Review not found"))?;

                recompute_company_rating(conn, row.company_id).await?;
                load_view_with_company(conn, row.id)
                    .await?
                    .ok_or_else(|| Error::internal("review vanished during moderation"))
            }
            .scope_boxed()
        })
        .await
    }

    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error> {
        let mut conn = self.db.conn().await?;

        let total: i64 = reviews::table
            .filter(reviews::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await?;

        let rows: Vec<(ReviewRow, UserRow, CompanyRow)> = reviews::table
            .inner_join(users::table)
            .inner_join(companies::table)
            .filter(reviews::status.eq(status.as_str()))
            .order(reviews::created_at.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .select((
                ReviewRow::as_select(),
                UserRow::as_select(),
                CompanyRow::as_select(),
            ))
            .load(&mut conn)
            .await?;

        let items = rows
            .into_iter()
            .map(|(review, user, company)| {
                review_view(review, Some(&user), Some(company_summary(&company)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<ReviewView>, Error> {
        let mut conn = self.db.conn().await?;
        let pattern = format!("%{term}%");

        let total: i64 = reviews::table
            .filter(reviews::status.eq(ModerationStatus::Approved.as_str()))
            .filter(reviews::text.ilike(pattern.clone()))
            .count()
            .get_result(&mut conn)
            .await?;

        let rows: Vec<(ReviewRow, UserRow, CompanyRow)> = reviews::table
            .inner_join(users::table)
            .inner_join(companies::table)
            .filter(reviews::status.eq(ModerationStatus::Approved.as_str()))
            .filter(reviews::text.ilike(pattern))
            .order(reviews::created_at.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .select((
                ReviewRow::as_select(),
                UserRow::as_select(),
                CompanyRow::as_select(),
            ))
            .load(&mut conn)
            .await?;

        let items = rows
            .into_iter()
            .map(|(review, user, company)| {
                review_view(review, Some(&user), Some(company_summary(&company)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }
}
