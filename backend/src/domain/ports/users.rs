//! Account storage port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::user::{NewUser, ProfileUpdate, User};

/// Durable storage for registered accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create an account; fails with a conflict when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, Error>;

    /// Look up an account by login email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, Error>;

    /// Apply a partial profile update and return the fresh account.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, Error>;
}
