//! PostgreSQL-backed `UserRepository` using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::UserRepository;
use crate::domain::{Error, NewUser, ProfileUpdate, User};

use super::pool::Db;
use super::rows::{NewUserRow, UserChangeset, UserRow};
use super::schema::users;

/// Diesel-backed account storage.
#[derive(Clone)]
pub struct DieselUserRepository {
    db: Db,
}

impl DieselUserRepository {
    /// Create a repository over the shared pool.
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let mut conn = self.db.conn().await?;

        let taken: i64 = users::table
            .filter(users::email.eq(&user.email))
            .count()
            .get_result(&mut conn)
            .await?;
        if taken > 0 {
            return Err(Error::conflict("User already exists"));
        }

        let row = NewUserRow {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role.as_str().to_owned(),
            created_at: Utc::now(),
        };
        // A concurrent registration still trips the unique index, which maps
        // to a conflict.
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .get_result(&mut conn)
            .await?;
        inserted.into_domain()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let mut conn = self.db.conn().await?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(UserRow::into_domain).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, Error> {
        let mut conn = self.db.conn().await?;
        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(UserRow::into_domain).transpose()
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, Error> {
        let mut conn = self.db.conn().await?;

        let changeset = UserChangeset {
            name: update.name,
            avatar: update.avatar,
        };
        // An all-None changeset is not a valid UPDATE statement; fall back to
        // a plain fetch so no-op updates still return the profile.
        if changeset.name.is_none() && changeset.avatar.is_none() {
            let row: Option<UserRow> = users::table
                .find(id)
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()?;
            return row
                .ok_or_else(|| Error::not_found("User not found"))?
                .into_domain();
        }

        let row: Option<UserRow> = diesel::update(users::table.find(id))
            .set(&changeset)
            .get_result(&mut conn)
            .await
            .optional()?;
        row.ok_or_else(|| Error::not_found("User not found"))?
            .into_domain()
    }
}
