//! Server construction and wiring.
//!
//! Builds the handler state for the configured storage backend (Diesel over
//! PostgreSQL, or the in-memory store when no database is configured),
//! optionally bootstraps an admin account, and assembles the actix app.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::auth::hash_password;
use crate::domain::{ContentPolicy, Error, NewUser, UserRole};
use crate::inbound::http::auth::TokenCodec;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{catalog, forum, health, moderation, reviews, search, uploads, users};
use crate::outbound::persistence::{Db, run_migrations};
use crate::outbound::storage::DiskUploadStore;

/// Register the API routes and shared state on an actix app.
///
/// Kept separate from [`run`] so integration tests can assemble the same
/// app against an in-memory state.
pub fn configure(state: HttpState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(state)).service(
            web::scope("/api")
                .service(users::scope())
                .service(catalog::scope())
                .service(forum::scope())
                .service(reviews::scope())
                .service(moderation::scope())
                .service(search::scope())
                .service(health::health)
                .service(uploads::upload_file)
                .service(uploads::upload_photos),
        );
    }
}

/// Build handler state for the configured backend.
///
/// With a database URL: run pending migrations, connect the pool, and wire
/// the Diesel adapters. Without one: volatile in-memory storage, for local
/// development.
pub async fn build_state(config: &ServerConfig) -> Result<HttpState, Error> {
    let uploads = DiskUploadStore::new(&config.upload_dir, "/uploads");
    uploads.prepare().await?;
    let uploads: Arc<dyn crate::domain::ports::UploadStore> = Arc::new(uploads);

    let tokens = TokenCodec::new(&config.token_secret);
    let policy = ContentPolicy {
        require_content_review: config.require_content_review,
    };

    let state = match &config.database_url {
        Some(url) => {
            run_migrations(url).await?;
            let db = Db::connect(url, config.database_pool_size).await?;
            tracing::info!("database connected");
            HttpState::with_database(db, uploads, tokens, policy)
        }
        None => {
            tracing::warn!("no database configured; state is volatile and lost on restart");
            let (state, _store) = HttpState::in_memory(uploads, tokens, policy);
            state
        }
    };

    bootstrap_admin(&state, config).await?;
    Ok(state)
}

/// Create the configured admin account if it does not exist yet.
async fn bootstrap_admin(state: &HttpState, config: &ServerConfig) -> Result<(), Error> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    if let Some(existing) = state.users.find_by_email(email).await? {
        if !existing.is_admin() {
            tracing::warn!(%email, "configured admin email belongs to a non-admin account");
        }
        return Ok(());
    }
    let user = state
        .users
        .create(NewUser {
            email: email.clone(),
            password_hash: hash_password(password)?,
            name: "Administrator".to_owned(),
            role: UserRole::Admin,
        })
        .await?;
    tracing::info!(user_id = %user.id, "admin account bootstrapped");
    Ok(())
}

/// Build state, bind, and serve until shutdown.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let state = build_state(&config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let upload_dir = config.upload_dir.clone();

    let server = HttpServer::new(move || {
        let app = App::new()
            .configure(configure(state.clone()))
            .service(actix_files::Files::new("/uploads", upload_dir.clone()));
        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
        app
    })
    .bind(config.bind_addr)?;

    tracing::info!(addr = %config.bind_addr, "listening");
    server.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::rstest;

    fn in_memory_config(dir: &std::path::Path) -> ServerConfig {
        ServerConfig::try_parse_from([
            "backend",
            "--upload-dir",
            dir.to_str().expect("utf8 path"),
            "--admin-email",
            "admin@example.net",
            "--admin-password",
            "admin-password",
        ])
        .expect("config parses")
    }

    #[rstest]
    #[tokio::test]
    async fn build_state_bootstraps_the_admin_account() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = in_memory_config(dir.path());

        let state = build_state(&config).await.expect("state builds");
        let admin = state
            .users
            .find_by_email("admin@example.net")
            .await
            .expect("lookup succeeds")
            .expect("admin exists");
        assert!(admin.is_admin());
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = in_memory_config(dir.path());

        let state = build_state(&config).await.expect("state builds");
        bootstrap_admin(&state, &config)
            .await
            .expect("second bootstrap is a no-op");
    }
}
