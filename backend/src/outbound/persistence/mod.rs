//! Storage adapters.
//!
//! Two families implement the domain ports: Diesel/PostgreSQL adapters for
//! production and the [`MemoryStore`] for tests and the no-database dev
//! mode. Diesel failures convert into the shared domain error here so
//! repository code can use `?` end to end, including inside transactions.

mod diesel_articles;
mod diesel_comments;
mod diesel_companies;
mod diesel_reviews;
mod diesel_users;
mod memory;
mod pool;
mod rows;
pub mod schema;

pub use diesel_articles::DieselArticleRepository;
pub use diesel_comments::DieselCommentRepository;
pub use diesel_companies::DieselCompanyRepository;
pub use diesel_reviews::DieselReviewRepository;
pub use diesel_users::DieselUserRepository;
pub use memory::MemoryStore;
pub use pool::{Db, DbError, MIGRATIONS, run_migrations};

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::Error;
use crate::domain::ports::HealthProbe;

impl From<diesel::result::Error> for Error {
    fn from(error: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match &error {
            DieselError::NotFound => Self::not_found("record not found"),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                tracing::debug!(message = info.message(), "unique constraint violated");
                Self::conflict("duplicate record")
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                tracing::debug!(message = info.message(), "foreign key violated");
                Self::invalid_request("referenced record does not exist")
            }
            _ => {
                tracing::error!(error = %error, "database operation failed");
                Self::internal(format!("database error: {error}"))
            }
        }
    }
}

/// Clamp a pagination offset or limit into the `i64` range Diesel expects.
pub(crate) fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl HealthProbe for Db {
    async fn ping(&self) -> Result<(), Error> {
        let mut conn = self.conn().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use diesel::result::Error as DieselError;
    use rstest::rstest;

    #[rstest]
    fn not_found_rows_map_to_404() {
        let error: Error = DieselError::NotFound.into();
        assert_eq!(error.code, ErrorCode::NotFound);
    }

    #[rstest]
    fn broken_transactions_map_to_500() {
        let error: Error = DieselError::RollbackTransaction.into();
        assert_eq!(error.code, ErrorCode::InternalError);
    }

    #[rstest]
    fn offsets_clamp_into_i64() {
        assert_eq!(to_i64(7), 7);
        assert_eq!(to_i64(u64::MAX), i64::MAX);
    }
}
