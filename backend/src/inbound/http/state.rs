//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and depend on the domain
//! ports only, so the same handler code runs against Diesel adapters in
//! production and the in-memory store in tests and dev mode.

use std::sync::Arc;

use crate::domain::ContentPolicy;
use crate::domain::ports::{
    ArticleRepository, CommentRepository, CompanyRepository, HealthProbe, ReviewRepository,
    UploadStore, UserRepository,
};
use crate::outbound::persistence::{
    Db, DieselArticleRepository, DieselCommentRepository, DieselCompanyRepository,
    DieselReviewRepository, DieselUserRepository, MemoryStore,
};

use super::auth::TokenCodec;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account storage.
    pub users: Arc<dyn UserRepository>,
    /// Company storage.
    pub companies: Arc<dyn CompanyRepository>,
    /// Review storage and rating-aggregation trigger.
    pub reviews: Arc<dyn ReviewRepository>,
    /// Article storage.
    pub articles: Arc<dyn ArticleRepository>,
    /// Comment storage.
    pub comments: Arc<dyn CommentRepository>,
    /// Upload storage.
    pub uploads: Arc<dyn UploadStore>,
    /// Storage connectivity probe.
    pub health: Arc<dyn HealthProbe>,
    /// Access-token codec.
    pub tokens: TokenCodec,
    /// Initial-status policy for new content.
    pub policy: ContentPolicy,
}

impl HttpState {
    /// State backed by the Diesel adapters over one shared pool.
    pub fn with_database(
        db: Db,
        uploads: Arc<dyn UploadStore>,
        tokens: TokenCodec,
        policy: ContentPolicy,
    ) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(db.clone())),
            companies: Arc::new(DieselCompanyRepository::new(db.clone())),
            reviews: Arc::new(DieselReviewRepository::new(db.clone())),
            articles: Arc::new(DieselArticleRepository::new(db.clone())),
            comments: Arc::new(DieselCommentRepository::new(db.clone())),
            uploads,
            health: Arc::new(db),
            tokens,
            policy,
        }
    }

    /// State backed by the in-memory store; the store handle is returned so
    /// tests and the dev-mode bootstrap can seed data behind the handlers.
    pub fn in_memory(
        uploads: Arc<dyn UploadStore>,
        tokens: TokenCodec,
        policy: ContentPolicy,
    ) -> (Self, MemoryStore) {
        let store = MemoryStore::new();
        let state = Self {
            users: Arc::new(store.clone()),
            companies: Arc::new(store.clone()),
            reviews: Arc::new(store.clone()),
            articles: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            uploads,
            health: Arc::new(store.clone()),
            tokens,
            policy,
        };
        (state, store)
    }
}
