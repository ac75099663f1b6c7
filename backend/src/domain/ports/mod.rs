//! Driving ports for the hexagonal boundary.
//!
//! HTTP handlers depend on these traits only; production wires the Diesel
//! adapters behind them, tests and the no-database dev mode wire the
//! in-memory store. All ports speak the shared [`Error`](crate::domain::Error)
//! currency; adapters map their backend-specific failures before returning.

mod articles;
mod comments;
mod companies;
mod reviews;
mod users;

pub use articles::ArticleRepository;
pub use comments::CommentRepository;
pub use companies::CompanyRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

use async_trait::async_trait;

use super::error::Error;

/// Storage connectivity probe for the health endpoint.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Check that the backing store answers a trivial query.
    async fn ping(&self) -> Result<(), Error>;
}

/// A stored upload and the URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Generated file name, unique per upload.
    pub filename: String,
    /// Stable retrieval URL.
    pub url: String,
}

/// Durable storage for uploaded images.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist one validated upload and return its retrieval URL.
    ///
    /// `extension` has already passed the allow-list; the store chooses the
    /// final file name.
    async fn save(&self, extension: &str, bytes: Vec<u8>) -> Result<StoredUpload, Error>;
}
