//! Review endpoints.
//!
//! ```text
//! POST   /api/reviews               create (authenticated, one per company)
//! GET    /api/reviews/user          caller's reviews with company summaries
//! GET    /api/reviews/company/{id}  approved reviews of a company
//! GET    /api/reviews/{id}          fetch own review
//! PUT    /api/reviews/{id}          update own review
//! DELETE /api/reviews/{id}          delete own review
//! ```
//!
//! Review creation strictly requires authentication; that identity is what
//! the one-review-per-company constraint keys on. Every mutation here
//! triggers the rating recomputation for the affected company.

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ApiResult, Error, NewReview, Review, ReviewUpdate, ReviewView, rating};

use super::auth::AuthContext;
use super::state::HttpState;

/// Review creation request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Reviewed company.
    pub company_id: Option<Uuid>,
    /// Star rating, 1 to 5.
    pub rating: Option<i32>,
    /// Free-text body.
    pub text: Option<String>,
    /// Photo URLs, at most five.
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Review update request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    /// New star rating.
    pub rating: Option<i32>,
    /// New body text.
    pub text: Option<String>,
    /// Replacement photo list.
    pub photos: Option<Vec<String>>,
}

/// Paginated reviews envelope.
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    /// Reviews in the requested window.
    pub reviews: Vec<ReviewView>,
    /// Pagination envelope.
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Load a review and check the caller authored it.
async fn owned_review(state: &HttpState, auth: &AuthContext, id: Uuid) -> Result<Review, Error> {
    let user_id = auth.require_user_id()?;
    let review = state
        .reviews
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("Review not found"))?;
    if review.user_id != user_id {
        return Err(Error::forbidden("Access denied"));
    }
    Ok(review)
}

/// Submit a review; the company aggregate updates in the same transaction.
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewView),
        (status = 400, description = "Missing or invalid fields", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Unknown company", body = Error),
        (status = 409, description = "Already reviewed", body = Error)
    ),
    tags = ["reviews"]
)]
#[post("")]
pub async fn create_review(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = auth.require_user_id()?;
    let payload = payload.into_inner();

    let missing = "Company ID and rating are required";
    let company_id = payload
        .company_id
        .ok_or_else(|| Error::invalid_request(missing))?;
    let stars = payload
        .rating
        .ok_or_else(|| Error::invalid_request(missing))?;
    rating::validate(stars)?;

    let review = state
        .reviews
        .create(NewReview {
            company_id,
            user_id,
            rating: stars,
            text: payload.text,
            photos: payload.photos,
            status: state.policy.initial_content_status(),
        })
        .await?;
    tracing::info!(%company_id, %user_id, "review submitted");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Review created successfully",
        "review": review,
    })))
}

/// Fetch one of the caller's reviews.
#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    responses(
        (status = 200, description = "Review", body = ReviewView),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown review", body = Error)
    ),
    tags = ["reviews"]
)]
#[get("/{id}")]
pub async fn get_review(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    owned_review(&state, &auth, id).await?;
    let view = state
        .reviews
        .view(id)
        .await?
        .ok_or_else(|| Error::not_found("Review not found"))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "review": view })))
}

/// Update one of the caller's reviews.
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated"),
        (status = 400, description = "Invalid rating", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown review", body = Error)
    ),
    tags = ["reviews"]
)]
#[put("/{id}")]
pub async fn update_review(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    owned_review(&state, &auth, id).await?;

    let payload = payload.into_inner();
    if let Some(stars) = payload.rating {
        rating::validate(stars)?;
    }
    let view = state
        .reviews
        .update(
            id,
            ReviewUpdate {
                rating: payload.rating,
                text: payload.text.map(Some),
                photos: payload.photos,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Review updated successfully",
        "review": view,
    })))
}

/// Delete one of the caller's reviews.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    responses(
        (status = 200, description = "Review deleted"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown review", body = Error)
    ),
    tags = ["reviews"]
)]
#[delete("/{id}")]
pub async fn delete_review(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    owned_review(&state, &auth, id).await?;
    state.reviews.delete(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Review deleted successfully",
    })))
}

/// Approved reviews of one company, newest first.
#[utoipa::path(
    get,
    path = "/api/reviews/company/{id}",
    responses((status = 200, description = "Paginated reviews")),
    tags = ["reviews"]
)]
#[get("/company/{id}")]
pub async fn company_reviews(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ReviewListResponse>> {
    let page = PageRequest::from_params(query.page, query.per_page);
    let result = state
        .reviews
        .list_for_company(path.into_inner(), page)
        .await?;
    Ok(web::Json(ReviewListResponse {
        reviews: result.items,
        page: result.info,
    }))
}

/// The caller's reviews across all companies.
#[utoipa::path(
    get,
    path = "/api/reviews/user",
    responses(
        (status = 200, description = "Paginated reviews"),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["reviews"]
)]
#[get("/user")]
pub async fn user_reviews(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<ReviewListResponse>> {
    let user_id = auth.require_user_id()?;
    let page = PageRequest::from_params(query.page, query.per_page);
    let result = state.reviews.list_for_user(user_id, page).await?;
    Ok(web::Json(ReviewListResponse {
        reviews: result.items,
        page: result.info,
    }))
}

/// Mount the review endpoints.
///
/// `user` and `company/{id}` register before `{id}` so they are not
/// swallowed by the id matcher.
pub fn scope() -> actix_web::Scope {
    web::scope("/reviews")
        .service(user_reviews)
        .service(company_reviews)
        .service(create_review)
        .service(get_review)
        .service(update_review)
        .service(delete_review)
}
