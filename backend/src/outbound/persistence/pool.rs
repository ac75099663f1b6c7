//! Async PostgreSQL connection pool and startup migrations.
//!
//! Wraps `diesel-async` with a `bb8` pool. Pool failures are mapped to the
//! shared domain error at the point of checkout so repository code can use
//! `?` throughout.

use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::Error;

/// SQL migrations compiled into the binary; applied at startup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while building or using the connection pool.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The pool could not be constructed.
    #[error("failed to build connection pool: {0}")]
    Build(String),
    /// No connection could be checked out in time.
    #[error("failed to get connection from pool: {0}")]
    Checkout(String),
}

impl From<DbError> for Error {
    fn from(error: DbError) -> Self {
        Self::internal(error.to_string())
    }
}

/// Shared async connection pool; clones are cheap handles.
#[derive(Clone)]
pub struct Db {
    pool: Pool<AsyncPgConnection>,
}

impl Db {
    /// Connect to `database_url` with at most `max_size` pooled connections.
    pub async fn connect(database_url: &str, max_size: u32) -> Result<Self, DbError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .await
            .map_err(|err| DbError::Build(err.to_string()))?;
        Ok(Self { pool })
    }

    /// Check a connection out of the pool.
    pub async fn conn(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, Error> {
        self.pool
            .get()
            .await
            .map_err(|err| DbError::Checkout(err.to_string()).into())
    }
}

/// Apply pending migrations against `database_url`.
///
/// Diesel migrations run over a synchronous connection, so the work moves to
/// a blocking thread wrapped around the async connection type.
pub async fn run_migrations(database_url: &str) -> Result<(), Error> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        use diesel::Connection;
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)
            .map_err(|err| Error::internal(format!("database connection failed: {err}")))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|err| Error::internal(format!("running migrations failed: {err}")))
    })
    .await
    .map_err(|err| Error::internal(format!("migration task panicked: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn db_errors_map_to_internal() {
        let error: Error = DbError::Checkout("connection refused".to_owned()).into();
        assert_eq!(error.code, crate::domain::ErrorCode::InternalError);
        assert!(error.message.contains("connection refused"));
    }
}
