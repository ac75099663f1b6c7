//! Moderation queues and status transitions.
//!
//! ```text
//! GET  /api/moderation/companies             queue (default: pending)
//! GET  /api/moderation/reviews               queue
//! GET  /api/moderation/articles              queue
//! GET  /api/moderation/comments              queue
//! POST /api/moderation/companies/{id}/moderate
//! POST /api/moderation/reviews/{id}/moderate
//! POST /api/moderation/articles/{id}/moderate
//! POST /api/moderation/comments/{id}/moderate
//! ```
//!
//! Every endpoint is admin-gated. Transitions parse the target state through
//! the closed status enum, so an unknown status never reaches storage; a
//! review transition recomputes the owning company's aggregate inside the
//! same transaction as the status write.

use actix_web::{HttpResponse, get, post, web};
use pagination::{PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ApiResult, ArticleView, CommentView, Company, ModerationStatus, ReviewView};

use super::auth::{AuthContext, require_admin};
use super::state::HttpState;

/// Moderation queues default to larger pages than public listings.
const QUEUE_PER_PAGE: u32 = 20;

/// Queue query parameters.
#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Page size, default 20.
    pub per_page: Option<u32>,
    /// Queue status filter, default `pending`.
    pub status: Option<String>,
}

impl QueueQuery {
    fn page_request(&self) -> PageRequest {
        PageRequest::from_params(self.page, self.per_page.or(Some(QUEUE_PER_PAGE)))
    }

    fn status(&self) -> ApiResult<ModerationStatus> {
        match self.status.as_deref() {
            None => Ok(ModerationStatus::Pending),
            Some(raw) => ModerationStatus::parse(raw),
        }
    }
}

/// Moderation transition request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModerateRequest {
    /// Target status: `pending`, `approved`, or `rejected`.
    pub status: Option<String>,
}

impl ModerateRequest {
    fn status(&self) -> ApiResult<ModerationStatus> {
        ModerationStatus::parse(self.status.as_deref().unwrap_or_default())
    }
}

/// Paginated queue envelope for companies.
#[derive(Debug, Serialize)]
pub struct CompanyQueueResponse {
    /// Companies in the queue window.
    pub companies: Vec<Company>,
    /// Pagination envelope.
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Paginated queue envelope for reviews.
#[derive(Debug, Serialize)]
pub struct ReviewQueueResponse {
    /// Reviews in the queue window.
    pub reviews: Vec<ReviewView>,
    /// Pagination envelope.
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Paginated queue envelope for articles.
#[derive(Debug, Serialize)]
pub struct ArticleQueueResponse {
    /// Articles in the queue window.
    pub articles: Vec<ArticleView>,
    /// Pagination envelope.
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Paginated queue envelope for comments.
#[derive(Debug, Serialize)]
pub struct CommentQueueResponse {
    /// Comments in the queue window.
    pub comments: Vec<CommentView>,
    /// Pagination envelope.
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Companies awaiting moderation.
#[utoipa::path(
    get,
    path = "/api/moderation/companies",
    responses(
        (status = 200, description = "Queue page"),
        (status = 403, description = "Admin role required")
    ),
    tags = ["moderation"]
)]
#[get("/companies")]
pub async fn company_queue(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<QueueQuery>,
) -> ApiResult<web::Json<CompanyQueueResponse>> {
    require_admin(&state, &auth).await?;
    let result = state
        .companies
        .queue(query.status()?, query.page_request())
        .await?;
    Ok(web::Json(CompanyQueueResponse {
        companies: result.items,
        page: result.info,
    }))
}

/// Reviews awaiting moderation.
#[utoipa::path(
    get,
    path = "/api/moderation/reviews",
    responses(
        (status = 200, description = "Queue page"),
        (status = 403, description = "Admin role required")
    ),
    tags = ["moderation"]
)]
#[get("/reviews")]
pub async fn review_queue(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<QueueQuery>,
) -> ApiResult<web::Json<ReviewQueueResponse>> {
    require_admin(&state, &auth).await?;
    let result = state
        .reviews
        .queue(query.status()?, query.page_request())
        .await?;
    Ok(web::Json(ReviewQueueResponse {
        reviews: result.items,
        page: result.info,
    }))
}

/// Articles awaiting moderation.
#[utoipa::path(
    get,
    path = "/api/moderation/articles",
    responses(
        (status = 200, description = "Queue page"),
        (status = 403, description = "Admin role required")
    ),
    tags = ["moderation"]
)]
#[get("/articles")]
pub async fn article_queue(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<QueueQuery>,
) -> ApiResult<web::Json<ArticleQueueResponse>> {
    require_admin(&state, &auth).await?;
    let result = state
        .articles
        .queue(query.status()?, query.page_request())
        .await?;
    Ok(web::Json(ArticleQueueResponse {
        articles: result.items,
        page: result.info,
    }))
}

/// Comments awaiting moderation.
#[utoipa::path(
    get,
    path = "/api/moderation/comments",
    responses(
        (status = 200, description = "Queue page"),
        (status = 403, description = "Admin role required")
    ),
    tags = ["moderation"]
)]
#[get("/comments")]
pub async fn comment_queue(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<QueueQuery>,
) -> ApiResult<web::Json<CommentQueueResponse>> {
    require_admin(&state, &auth).await?;
    let result = state
        .comments
        .queue(query.status()?, query.page_request())
        .await?;
    Ok(web::Json(CommentQueueResponse {
        comments: result.items,
        page: result.info,
    }))
}

/// Transition a company's status.
#[utoipa::path(
    post,
    path = "/api/moderation/companies/{id}/moderate",
    request_body = ModerateRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unknown company")
    ),
    tags = ["moderation"]
)]
#[post("/companies/{id}/moderate")]
pub async fn moderate_company(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<ModerateRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &auth).await?;
    let status = payload.status()?;
    let company = state.companies.set_status(path.into_inner(), status).await?;
    tracing::info!(company_id = %company.id, status = %status, "company moderated");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Company status updated",
        "company": {
            "id": company.id,
            "name": company.name,
            "status": company.status,
        },
    })))
}

/// Transition a review's status; the company aggregate updates with it.
#[utoipa::path(
    post,
    path = "/api/moderation/reviews/{id}/moderate",
    request_body = ModerateRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unknown review")
    ),
    tags = ["moderation"]
)]
#[post("/reviews/{id}/moderate")]
pub async fn moderate_review(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<ModerateRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &auth).await?;
    let status = payload.status()?;
    let review = state.reviews.set_status(path.into_inner(), status).await?;
    tracing::info!(review_id = %review.id, status = %status, "review moderated");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Review status updated",
        "review": review,
    })))
}

/// Transition an article's status.
#[utoipa::path(
    post,
    path = "/api/moderation/articles/{id}/moderate",
    request_body = ModerateRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unknown article")
    ),
    tags = ["moderation"]
)]
#[post("/articles/{id}/moderate")]
pub async fn moderate_article(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<ModerateRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &auth).await?;
    let status = payload.status()?;
    let article = state.articles.set_status(path.into_inner(), status).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Article status updated",
        "article": article,
    })))
}

/// Transition a comment's status.
#[utoipa::path(
    post,
    path = "/api/moderation/comments/{id}/moderate",
    request_body = ModerateRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unknown comment")
    ),
    tags = ["moderation"]
)]
#[post("/comments/{id}/moderate")]
pub async fn moderate_comment(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<ModerateRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &auth).await?;
    let status = payload.status()?;
    let comment = state.comments.set_status(path.into_inner(), status).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment status updated",
        "comment": comment,
    })))
}

/// Mount the moderation endpoints.
pub fn scope() -> actix_web::Scope {
    web::scope("/moderation")
        .service(company_queue)
        .service(review_queue)
        .service(article_queue)
        .service(comment_queue)
        .service(moderate_company)
        .service(moderate_review)
        .service(moderate_article)
        .service(moderate_comment)
}
