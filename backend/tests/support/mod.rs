//! Shared fixtures for the HTTP integration tests.
//!
//! Tests assemble the real server routing over the in-memory store, so the
//! full request path (extractors, authorization, handlers, ports) runs
//! without a database.

// Each test binary compiles this module; not every binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test as actix_test;
use serde_json::Value;
use uuid::Uuid;

use backend::domain::auth::hash_password;
use backend::domain::ports::{UploadStore, UserRepository};
use backend::domain::{ContentPolicy, NewUser, UserRole};
use backend::inbound::http::auth::TokenCodec;
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::MemoryStore;
use backend::outbound::storage::DiskUploadStore;

/// Signing secret shared by every test state.
pub const TEST_SECRET: &str = "integration-test-secret";

/// Build handler state over a fresh in-memory store.
pub fn test_state() -> (HttpState, MemoryStore, TokenCodec) {
    let uploads: Arc<dyn UploadStore> = Arc::new(DiskUploadStore::new(
        std::env::temp_dir().join("backend-test-uploads"),
        "/uploads",
    ));
    let tokens = TokenCodec::new(TEST_SECRET);
    let (state, store) = HttpState::in_memory(uploads, tokens.clone(), ContentPolicy::default());
    (state, store, tokens)
}

/// Seed an admin account directly in the store and mint its token.
pub async fn seed_admin(store: &MemoryStore, tokens: &TokenCodec) -> (Uuid, String) {
    let admin = store
        .create(NewUser {
            email: "admin@example.net".to_owned(),
            password_hash: hash_password("admin password").expect("hashing succeeds"),
            name: "Administrator".to_owned(),
            role: UserRole::Admin,
        })
        .await
        .expect("admin seeded");
    let token = tokens.issue(admin.id).expect("token issued");
    (admin.id, token)
}

/// POST a JSON body, optionally with a bearer token.
pub async fn post_json<S>(
    app: &S,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut request = actix_test::TestRequest::post().uri(uri).set_json(body);
    if let Some(token) = token {
        request = request.insert_header(("Authorization", format!("Bearer {token}")));
    }
    actix_test::call_service(app, request.to_request()).await
}

/// GET a URI, optionally with a bearer token.
pub async fn get<S>(app: &S, uri: &str, token: Option<&str>) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut request = actix_test::TestRequest::get().uri(uri);
    if let Some(token) = token {
        request = request.insert_header(("Authorization", format!("Bearer {token}")));
    }
    actix_test::call_service(app, request.to_request()).await
}

/// DELETE a URI with a bearer token.
pub async fn delete<S>(app: &S, uri: &str, token: &str) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::delete()
        .uri(uri)
        .insert_header(("Authorization", format!("Bearer {token}")));
    actix_test::call_service(app, request.to_request()).await
}

/// Register an account through the API, returning `(user_id, token)`.
pub async fn register<S>(app: &S, email: &str, name: &str) -> (Uuid, String)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = post_json(
        app,
        "/api/auth/register",
        None,
        serde_json::json!({
            "email": email,
            "password": "a strong password",
            "name": name,
        }),
    )
    .await;
    assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    let user_id = body["user"]["id"]
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .expect("user id in response");
    let token = body["access_token"]
        .as_str()
        .expect("token in response")
        .to_owned();
    (user_id, token)
}

/// Create a company through the API and return its id.
pub async fn create_company<S>(app: &S, token: &str, name: &str) -> Uuid
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = post_json(
        app,
        "/api/catalog",
        Some(token),
        serde_json::json!({
            "name": name,
            "category": "Food",
            "city": "Leeds",
        }),
    )
    .await;
    assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    body["company"]["id"]
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .expect("company id in response")
}
