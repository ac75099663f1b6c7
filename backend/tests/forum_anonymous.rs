//! Anonymous and authenticated authorship behaviour on the forum.

mod support;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use actix_web::App;
use backend::server;
use serde_json::Value;

use support::{delete, get, post_json, register, seed_admin, test_state};

async fn create_article(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    token: Option<&str>,
    body: Value,
) -> String {
    let response = post_json(app, "/api/forum/articles", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    body["article"]["id"].as_str().expect("article id").to_owned()
}

#[actix_web::test]
async fn anonymous_comment_defaults_its_display_name() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    let article_id = create_article(
        &app,
        None,
        serde_json::json!({ "title": "Opening week", "content": "We are open." }),
    )
    .await;

    // No token, no anonymous_name: the fixed default applies.
    let response = post_json(
        &app,
        &format!("/api/forum/articles/{article_id}/comments"),
        None,
        serde_json::json!({ "text": "Looks great" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body["comment"]["author"]["name"].as_str(),
        Some("Anonymous user")
    );
    assert!(body["comment"]["author"]["id"].is_null());

    // A supplied name is kept.
    let response = post_json(
        &app,
        &format!("/api/forum/articles/{article_id}/comments"),
        None,
        serde_json::json!({ "text": "Me again", "anonymous_name": "Drifter" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["comment"]["author"]["name"].as_str(), Some("Drifter"));
}

#[actix_web::test]
async fn authenticated_authorship_ignores_the_anonymous_field() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    let (user_id, token) = register(&app, "casey@example.net", "Casey").await;
    let article_id = create_article(
        &app,
        Some(&token),
        serde_json::json!({
            "title": "Signed piece",
            "content": "Body text.",
            "anonymous_author": "Ghost",
        }),
    )
    .await;

    let response = get(&app, &format!("/api/forum/articles/{article_id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["author"]["name"].as_str(), Some("Casey"));
    assert_eq!(
        body["author"]["id"].as_str(),
        Some(user_id.to_string().as_str())
    );
}

#[actix_web::test]
async fn article_creation_validates_required_fields() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    let response = post_json(
        &app,
        "/api/forum/articles",
        None,
        serde_json::json!({ "title": "No content" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn detail_fetches_increment_the_view_counter() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    let article_id = create_article(
        &app,
        None,
        serde_json::json!({ "title": "Counted", "content": "Body." }),
    )
    .await;

    for expected in 1..=3 {
        let response = get(&app, &format!("/api/forum/articles/{article_id}"), None).await;
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["views"].as_i64(), Some(expected));
    }
}

#[actix_web::test]
async fn excerpt_is_derived_when_not_supplied() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    let long_content = "x".repeat(300);
    let article_id = create_article(
        &app,
        None,
        serde_json::json!({ "title": "Long", "content": long_content }),
    )
    .await;

    let response = get(&app, &format!("/api/forum/articles/{article_id}"), None).await;
    let body: Value = actix_test::read_body_json(response).await;
    let excerpt = body["excerpt"].as_str().expect("excerpt");
    assert_eq!(excerpt.len(), 203);
    assert!(excerpt.ends_with("..."));
}

#[actix_web::test]
async fn anonymous_articles_are_managed_by_admins_only() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let article_id = create_article(
        &app,
        None,
        serde_json::json!({ "title": "Unsigned", "content": "Body." }),
    )
    .await;

    // An ordinary authenticated user is not the author of an anonymous
    // article, so management is denied.
    let (_, user_token) = register(&app, "user@example.net", "User").await;
    let response = delete(&app, &format!("/api/forum/articles/{article_id}"), &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete(&app, &format!("/api/forum/articles/{article_id}"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &format!("/api/forum/articles/{article_id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn comments_cascade_away_with_their_article() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, author_token) = register(&app, "author@example.net", "Author").await;
    let article_id = create_article(
        &app,
        Some(&author_token),
        serde_json::json!({ "title": "Short lived", "content": "Body." }),
    )
    .await;

    let response = post_json(
        &app,
        &format!("/api/forum/articles/{article_id}/comments"),
        Some(&author_token),
        serde_json::json!({ "text": "First" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    let comment_id = body["comment"]["id"].as_str().expect("comment id").to_owned();

    let response = delete(&app, &format!("/api/forum/articles/{article_id}"), &author_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The comment is gone with its article; even an admin finds nothing.
    let response = get(&app, &format!("/api/forum/comments/{comment_id}"), Some(&admin_token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn tags_facet_lists_distinct_sorted_tags() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    for (title, tags) in [
        ("One", serde_json::json!(["food", "city"])),
        ("Two", serde_json::json!(["city", "art"])),
    ] {
        create_article(
            &app,
            None,
            serde_json::json!({ "title": title, "content": "Body.", "tags": tags }),
        )
        .await;
    }

    let response = get(&app, "/api/forum/tags", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, serde_json::json!(["art", "city", "food"]));
}
