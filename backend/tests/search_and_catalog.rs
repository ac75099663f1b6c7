//! Search, suggestions, catalog filtering, and the auth round trip.

mod support;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use actix_web::App;
use actix_web::test::TestRequest;
use backend::server;
use serde_json::Value;

use support::{create_company, get, post_json, register, seed_admin, test_state};

#[actix_web::test]
async fn login_round_trip_and_profile_update() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    register(&app, "casey@example.net", "Casey").await;

    // Wrong password is a 401, not a 500.
    let response = post_json(
        &app,
        "/api/auth/login",
        None,
        serde_json::json!({ "email": "casey@example.net", "password": "wrong" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        &app,
        "/api/auth/login",
        None,
        serde_json::json!({ "email": "casey@example.net", "password": "a strong password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    let token = body["access_token"].as_str().expect("token").to_owned();

    let request = TestRequest::put()
        .uri("/api/auth/profile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(serde_json::json!({ "name": "Casey Q." }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/auth/profile", Some(&token)).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["name"].as_str(), Some("Casey Q."));
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn duplicate_registration_conflicts() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    register(&app, "casey@example.net", "Casey").await;
    let response = post_json(
        &app,
        "/api/auth/register",
        None,
        serde_json::json!({
            "email": "casey@example.net",
            "password": "another password",
            "name": "Casey Again",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn mutating_endpoints_require_a_token() {
    let (state, _store, _tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;

    let response = post_json(
        &app,
        "/api/catalog",
        None,
        serde_json::json!({ "name": "X", "category": "Y", "city": "Z" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        &app,
        "/api/reviews",
        None,
        serde_json::json!({ "company_id": uuid::Uuid::new_v4(), "rating": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn catalog_filters_combine() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, owner_token) = register(&app, "owner@example.net", "Owner").await;
    for (name, category, city) in [
        ("Corner Bakery", "Food", "Leeds"),
        ("Iron Gym", "Fitness", "Leeds"),
        ("Harbour Cafe", "Food", "Hull"),
    ] {
        let response = post_json(
            &app,
            "/api/catalog",
            Some(&owner_token),
            serde_json::json!({ "name": name, "category": category, "city": city }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        let id = body["company"]["id"].as_str().expect("id").to_owned();
        let response = post_json(
            &app,
            &format!("/api/moderation/companies/{id}/moderate"),
            Some(&admin_token),
            serde_json::json!({ "status": "approved" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(&app, "/api/catalog?category=Food", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(2));

    let response = get(&app, "/api/catalog?category=Food&city=Leeds", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(1));
    assert_eq!(body["companies"][0]["name"].as_str(), Some("Corner Bakery"));

    let response = get(&app, "/api/catalog?search=harbour", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(1));

    let response = get(&app, "/api/catalog/categories", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, serde_json::json!(["Fitness", "Food"]));

    let response = get(&app, "/api/catalog/cities", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, serde_json::json!(["Hull", "Leeds"]));
}

#[actix_web::test]
async fn global_search_buckets_by_type() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, owner_token) = register(&app, "owner@example.net", "Owner").await;
    let company_id = create_company(&app, &owner_token, "Harbour Bakery").await;
    let response = post_json(
        &app,
        &format!("/api/moderation/companies/{company_id}/moderate"),
        Some(&admin_token),
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        "/api/forum/articles",
        None,
        serde_json::json!({ "title": "Harbour walks", "content": "Scenic." }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        &app,
        "/api/reviews",
        Some(&owner_token),
        serde_json::json!({ "company_id": company_id, "rating": 5, "text": "Best harbour views" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Empty query: empty buckets, no error.
    let response = get(&app, "/api/search?q=", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(0));

    let response = get(&app, "/api/search?q=harbour", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(3));
    assert_eq!(body["companies"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["articles"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["reviews"].as_array().map(Vec::len), Some(1));

    // Restricting the type narrows the buckets.
    let response = get(&app, "/api/search?q=harbour&type=articles", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(1));
    assert_eq!(body["companies"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn suggestions_respect_the_minimum_query_length() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, owner_token) = register(&app, "owner@example.net", "Owner").await;
    let company_id = create_company(&app, &owner_token, "Harbour Bakery").await;
    let response = post_json(
        &app,
        &format!("/api/moderation/companies/{company_id}/moderate"),
        Some(&admin_token),
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/search/suggestions?q=h", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["suggestions"].as_array().map(Vec::len), Some(0));

    let response = get(&app, "/api/search/suggestions?q=harb", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    let suggestions = body["suggestions"].as_array().expect("array");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0]["text"].as_str(), Some("Harbour Bakery"));
    assert_eq!(suggestions[0]["type"].as_str(), Some("company"));
}
