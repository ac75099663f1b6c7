//! End-to-end moderation and rating-aggregation behaviour over the API.

mod support;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use actix_web::App;
use backend::server;
use serde_json::Value;

use support::{create_company, delete, get, post_json, register, seed_admin, test_state};

async fn approve_company(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    admin_token: &str,
    company_id: uuid::Uuid,
) {
    let response = post_json(
        app,
        &format!("/api/moderation/companies/{company_id}/moderate"),
        Some(admin_token),
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn company_rating(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    company_id: uuid::Uuid,
) -> (f64, i64) {
    let response = get(app, &format!("/api/catalog/{company_id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    (
        body["rating"].as_f64().expect("rating present"),
        body["review_count"].as_i64().expect("count present"),
    )
}

#[actix_web::test]
async fn non_admins_cannot_moderate_anything() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, user_token) = register(&app, "user@example.net", "User").await;
    let company_id = create_company(&app, &user_token, "Corner Bakery").await;
    approve_company(&app, &admin_token, company_id).await;

    let id = uuid::Uuid::new_v4();
    for uri in [
        format!("/api/moderation/companies/{company_id}/moderate"),
        format!("/api/moderation/reviews/{id}/moderate"),
        format!("/api/moderation/articles/{id}/moderate"),
        format!("/api/moderation/comments/{id}/moderate"),
    ] {
        // A perfectly valid payload still fails on authorization.
        let payload = serde_json::json!({ "status": "approved" });
        let response = post_json(&app, &uri, Some(&user_token), payload.clone()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");

        let response = post_json(&app, &uri, None, payload).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[actix_web::test]
async fn invalid_status_is_rejected_without_mutation() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, owner_token) = register(&app, "owner@example.net", "Owner").await;
    let company_id = create_company(&app, &owner_token, "Corner Bakery").await;

    let response = post_json(
        &app,
        &format!("/api/moderation/companies/{company_id}/moderate"),
        Some(&admin_token),
        serde_json::json!({ "status": "published" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The company is still pending: absent from the public catalog, present
    // in the pending queue.
    let response = get(&app, "/api/catalog", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(0));

    let response = get(&app, "/api/moderation/companies", Some(&admin_token)).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(1));
}

#[actix_web::test]
async fn companies_wait_for_approval_before_listing() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, owner_token) = register(&app, "owner@example.net", "Owner").await;
    let company_id = create_company(&app, &owner_token, "Corner Bakery").await;

    let response = get(&app, &format!("/api/catalog/{company_id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    approve_company(&app, &admin_token, company_id).await;

    let response = get(&app, "/api/catalog", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(1));
    assert_eq!(body["companies"][0]["name"].as_str(), Some("Corner Bakery"));
    assert_eq!(company_rating(&app, company_id).await, (0.0, 0));
}

#[actix_web::test]
async fn ratings_track_the_approved_review_set() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, owner_token) = register(&app, "owner@example.net", "Owner").await;
    let (_, u1_token) = register(&app, "u1@example.net", "First").await;
    let (_, u2_token) = register(&app, "u2@example.net", "Second").await;
    let company_id = create_company(&app, &owner_token, "Corner Bakery").await;
    approve_company(&app, &admin_token, company_id).await;

    // First review: mean 5.0.
    let response = post_json(
        &app,
        "/api/reviews",
        Some(&u1_token),
        serde_json::json!({ "company_id": company_id, "rating": 5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    let first_review_id = body["review"]["id"].as_str().expect("id").to_owned();
    assert_eq!(company_rating(&app, company_id).await, (5.0, 1));

    // Second review: mean 4.0.
    let response = post_json(
        &app,
        "/api/reviews",
        Some(&u2_token),
        serde_json::json!({ "company_id": company_id, "rating": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    let second_review_id = body["review"]["id"].as_str().expect("id").to_owned();
    assert_eq!(company_rating(&app, company_id).await, (4.0, 2));

    // A duplicate from the same author conflicts.
    let response = post_json(
        &app,
        "/api/reviews",
        Some(&u1_token),
        serde_json::json!({ "company_id": company_id, "rating": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Deleting the first review drops the mean to 3.0.
    let response = delete(&app, &format!("/api/reviews/{first_review_id}"), &u1_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(company_rating(&app, company_id).await, (3.0, 1));

    // Rejecting the remaining review empties the approved set.
    let response = post_json(
        &app,
        &format!("/api/moderation/reviews/{second_review_id}/moderate"),
        Some(&admin_token),
        serde_json::json!({ "status": "rejected" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(company_rating(&app, company_id).await, (0.0, 0));

    // Re-approving restores it.
    let response = post_json(
        &app,
        &format!("/api/moderation/reviews/{second_review_id}/moderate"),
        Some(&admin_token),
        serde_json::json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(company_rating(&app, company_id).await, (3.0, 1));
}

#[actix_web::test]
async fn review_rating_is_validated() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, owner_token) = register(&app, "owner@example.net", "Owner").await;
    let company_id = create_company(&app, &owner_token, "Corner Bakery").await;
    approve_company(&app, &admin_token, company_id).await;

    for stars in [0, 6] {
        let response = post_json(
            &app,
            "/api/reviews",
            Some(&owner_token),
            serde_json::json!({ "company_id": company_id, "rating": stars }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn only_owners_manage_their_companies() {
    let (state, store, tokens) = test_state();
    let app = actix_test::init_service(App::new().configure(server::configure(state))).await;
    let (_, admin_token) = seed_admin(&store, &tokens).await;

    let (_, owner_token) = register(&app, "owner@example.net", "Owner").await;
    let (_, other_token) = register(&app, "other@example.net", "Other").await;
    let company_id = create_company(&app, &owner_token, "Corner Bakery").await;
    approve_company(&app, &admin_token, company_id).await;

    let response = delete(&app, &format!("/api/catalog/{company_id}"), &other_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete(&app, &format!("/api/catalog/{company_id}"), &owner_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/catalog", None).await;
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["total"].as_u64(), Some(0));
}
