//! PostgreSQL-backed `CompanyRepository` using Diesel.
//!
//! The reviews of a company cascade away with it at the schema level
//! (`ON DELETE CASCADE`), so deletion is a single statement here.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageInfo, PageRequest};
use uuid::Uuid;

use crate::domain::ports::CompanyRepository;
use crate::domain::{
    Company, CompanyDetail, CompanyFilter, CompanyUpdate, Error, ModerationStatus, NewCompany,
    UserSummary,
};

use super::diesel_reviews::review_view;
use super::pool::Db;
use super::rows::{CompanyChangeset, CompanyRow, NewCompanyRow, ReviewRow, UserRow};
use super::schema::{companies, reviews, users};
use super::to_i64;

/// Diesel-backed company storage.
#[derive(Clone)]
pub struct DieselCompanyRepository {
    db: Db,
}

impl DieselCompanyRepository {
    /// Create a repository over the shared pool.
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

/// Apply [`CompanyFilter`] to a boxed companies query.
///
/// Shared between the row query and the count query, which must stay in
/// lockstep for the pagination envelope to be truthful.
macro_rules! apply_company_filter {
    ($query:expr, $filter:expr) => {{
        let mut query = $query;
        match $filter.owner_id {
            Some(owner) => query = query.filter(companies::owner_id.eq(owner)),
            None => {
                query = query.filter(companies::status.eq(ModerationStatus::Approved.as_str()));
            }
        }
        if let Some(category) = &$filter.category {
            query = query.filter(companies::category.eq(category.clone()));
        }
        if let Some(city) = &$filter.city {
            query = query.filter(companies::city.eq(city.clone()));
        }
        if let Some(term) = &$filter.search {
            let pattern = format!("%{term}%");
            query = query.filter(
                companies::name
                    .ilike(pattern.clone())
                    .or(companies::category.ilike(pattern.clone()))
                    .or(companies::city.ilike(pattern.clone()))
                    .or(companies::description.ilike(pattern)),
            );
        }
        if let Some(floor) = $filter.min_rating {
            query = query.filter(companies::rating.ge(floor));
        }
        query
    }};
}

fn rows_to_companies(rows: Vec<CompanyRow>) -> Result<Vec<Company>, Error> {
    rows.into_iter().map(CompanyRow::into_domain).collect()
}

#[async_trait]
impl CompanyRepository for DieselCompanyRepository {
    async fn list(&self, filter: &CompanyFilter, page: PageRequest) -> Result<Page<Company>, Error> {
        let mut conn = self.db.conn().await?;

        let count_query = apply_company_filter!(
            companies::table.select(diesel::dsl::count_star()).into_boxed(),
            filter
        );
        let total: i64 = count_query.first(&mut conn).await?;

        let rows_query = apply_company_filter!(
            companies::table.select(CompanyRow::as_select()).into_boxed(),
            filter
        );
        let rows: Vec<CompanyRow> = rows_query
            .order(companies::rating.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .load(&mut conn)
            .await?;

        Ok(Page {
            items: rows_to_companies(rows)?,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }

    async fn detail(&self, id: Uuid) -> Result<Option<CompanyDetail>, Error> {
        let mut conn = self.db.conn().await?;

        let row: Option<CompanyRow> = companies::table
            .find(id)
            .filter(companies::status.eq(ModerationStatus::Approved.as_str()))
            .select(CompanyRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };

        let owner: Option<UserRow> = users::table
            .find(row.owner_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        let owner = owner.map(|user| UserSummary {
            id: user.id,
            name: user.name,
        });

        let review_rows: Vec<(ReviewRow, UserRow)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::company_id.eq(id))
            .filter(reviews::status.eq(ModerationStatus::Approved.as_str()))
            .order(reviews::created_at.desc())
            .limit(10)
            .select((ReviewRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await?;
        let review_views = review_rows
            .into_iter()
            .map(|(review, user)| review_view(review, Some(&user), None))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(CompanyDetail {
            company: row.into_domain()?,
            owner,
            reviews: review_views,
        }))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Company>, Error> {
        let mut conn = self.db.conn().await?;
        let row: Option<CompanyRow> = companies::table
            .find(id)
            .select(CompanyRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(CompanyRow::into_domain).transpose()
    }

    async fn create(&self, company: NewCompany) -> Result<Company, Error> {
        let mut conn = self.db.conn().await?;
        let now = Utc::now();
        let row = NewCompanyRow {
            id: Uuid::new_v4(),
            name: company.name,
            category: company.category,
            city: company.city,
            status: company.status.as_str().to_owned(),
            address: company.address,
            phone: company.phone,
            website: company.website,
            description: company.description,
            logo: company.logo,
            rating: 0.0,
            review_count: 0,
            owner_id: company.owner_id,
            created_at: now,
            updated_at: now,
        };
        let inserted: CompanyRow = diesel::insert_into(companies::table)
            .values(&row)
            .get_result(&mut conn)
            .await?;
        inserted.into_domain()
    }

    async fn update(&self, id: Uuid, update: CompanyUpdate) -> Result<Company, Error> {
        let mut conn = self.db.conn().await?;
        let changeset = CompanyChangeset {
            name: update.name,
            category: update.category,
            city: update.city,
            address: update.address,
            phone: update.phone,
            website: update.website,
            description: update.description,
            logo: update.logo,
            updated_at: Some(Utc::now()),
        };
        let row: Option<CompanyRow> = diesel::update(companies::table.find(id))
            .set(&changeset)
            .get_result(&mut conn)
            .await
            .optional()?;
        row.ok_or_else(|| Error::not_found("Company not found"))?
            .into_domain()
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut conn = self.db.conn().await?;
        let deleted = diesel::delete(companies::table.find(id))
            .execute(&mut conn)
            .await?;
        if deleted == 0 {
            return Err(Error::not_found("Company not found"));
        }
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<String>, Error> {
        let mut conn = self.db.conn().await?;
        let values: Vec<String> = companies::table
            .select(companies::category)
            .distinct()
            .order(companies::category.asc())
            .load(&mut conn)
            .await?;
        Ok(values)
    }

    async fn cities(&self) -> Result<Vec<String>, Error> {
        let mut conn = self.db.conn().await?;
        let values: Vec<String> = companies::table
            .select(companies::city)
            .distinct()
            .order(companies::city.asc())
            .load(&mut conn)
            .await?;
        Ok(values)
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<Company, Error> {
        let mut conn = self.db.conn().await?;
        let row: Option<CompanyRow> = diesel::update(companies::table.find(id))
            .set((
                companies::status.eq(status.as_str()),
                companies::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)
            .await
            .optional()?;
        row.ok_or_else(|| Error::not_found("Company not found"))?
            .into_domain()
    }

    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<Company>, Error> {
        let mut conn = self.db.conn().await?;

        let total: i64 = companies::table
            .filter(companies::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await?;

        let rows: Vec<CompanyRow> = companies::table
            .filter(companies::status.eq(status.as_str()))
            .order(companies::created_at.desc())
            .offset(to_i64(page.offset()))
            .limit(to_i64(page.limit()))
            .select(CompanyRow::as_select())
            .load(&mut conn)
            .await?;

        Ok(Page {
            items: rows_to_companies(rows)?,
            info: PageInfo::new(total.unsigned_abs(), page),
        })
    }

    async fn names_matching(&self, term: &str, limit: u32) -> Result<Vec<Company>, Error> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<CompanyRow> = companies::table
            .filter(companies::status.eq(ModerationStatus::Approved.as_str()))
            .filter(companies::name.ilike(format!("%{term}%")))
            .order(companies::name.asc())
            .limit(i64::from(limit))
            .select(CompanyRow::as_select())
            .load(&mut conn)
            .await?;
        rows_to_companies(rows)
    }

    async fn categories_matching(&self, term: &str, limit: u32) -> Result<Vec<String>, Error> {
        let mut conn = self.db.conn().await?;
        let values: Vec<String> = companies::table
            .filter(companies::status.eq(ModerationStatus::Approved.as_str()))
            .filter(companies::category.ilike(format!("%{term}%")))
            .select(companies::category)
            .distinct()
            .order(companies::category.asc())
            .limit(i64::from(limit))
            .load(&mut conn)
            .await?;
        Ok(values)
    }

    async fn cities_matching(&self, term: &str, limit: u32) -> Result<Vec<String>, Error> {
        let mut conn = self.db.conn().await?;
        let values: Vec<String> = companies::table
            .filter(companies::status.eq(ModerationStatus::Approved.as_str()))
            .filter(companies::city.ilike(format!("%{term}%")))
            .select(companies::city)
            .distinct()
            .order(companies::city.asc())
            .limit(i64::from(limit))
            .load(&mut conn)
            .await?;
        Ok(values)
    }
}
