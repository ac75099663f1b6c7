//! Forum endpoints: articles, comments, and the tag facet.
//!
//! ```text
//! GET    /api/forum/articles                list (tag/search filters)
//! POST   /api/forum/articles                create (login optional)
//! GET    /api/forum/articles/{id}           detail; bumps the view counter
//! PUT    /api/forum/articles/{id}           update (author or admin)
//! DELETE /api/forum/articles/{id}           delete (author or admin)
//! POST   /api/forum/articles/{id}/moderate  status transition (admin)
//! POST   /api/forum/articles/{id}/comments  comment (login optional)
//! GET    /api/forum/comments/{id}           fetch own comment
//! PUT    /api/forum/comments/{id}           update (author or admin)
//! DELETE /api/forum/comments/{id}           delete (author or admin)
//! GET    /api/forum/tags                    distinct tags of approved articles
//! ```
//!
//! Article and comment creation work without a login: when no valid token
//! accompanies the request the content is attributed to the payload's
//! anonymous name (or the fixed default). Anonymous-authored items have no
//! identity to authorise self-service edits, so only admins can remove them.

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    ANONYMOUS_AUTHOR, ANONYMOUS_USER, ApiResult, Article, ArticleDetail, ArticleFilter,
    ArticleUpdate, ArticleView, Author, Comment, Error, ModerationStatus, NewArticle, NewComment,
    User,
};

use super::auth::{AuthContext, current_user, require_admin};
use super::state::HttpState;

/// Forum listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ForumQuery {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Keep only articles carrying this tag.
    pub tag: Option<String>,
    /// Substring search over title, content, tags, and excerpt.
    pub search: Option<String>,
}

/// Paginated articles envelope.
#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    /// Articles in the requested window.
    pub articles: Vec<ArticleView>,
    /// Pagination envelope.
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Article create/update request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ArticleRequest {
    /// Headline.
    pub title: Option<String>,
    /// Full body.
    pub content: Option<String>,
    /// Explicit excerpt; derived from the content when absent.
    pub excerpt: Option<String>,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Ordered tag set.
    pub tags: Option<Vec<String>>,
    /// Display name when posting without a login; ignored otherwise.
    pub anonymous_author: Option<String>,
}

/// Comment creation request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    /// Comment body.
    pub text: Option<String>,
    /// Display name when posting without a login; ignored otherwise.
    pub anonymous_name: Option<String>,
}

/// Moderation transition request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ModerateRequest {
    /// Target status: `pending`, `approved`, or `rejected`.
    pub status: Option<String>,
}

/// List approved articles, newest first.
#[utoipa::path(
    get,
    path = "/api/forum/articles",
    responses((status = 200, description = "Paginated articles")),
    tags = ["forum"]
)]
#[get("/articles")]
pub async fn list_articles(
    state: web::Data<HttpState>,
    query: web::Query<ForumQuery>,
) -> ApiResult<web::Json<ArticleListResponse>> {
    let query = query.into_inner();
    let page = PageRequest::from_params(query.page, query.per_page);
    let filter = ArticleFilter {
        tag: query.tag.filter(|tag| !tag.is_empty()),
        search: query.search.filter(|term| !term.is_empty()),
    };
    let result = state.articles.list(&filter, page).await?;
    Ok(web::Json(ArticleListResponse {
        articles: result.items,
        page: result.info,
    }))
}

/// Fetch one approved article; every fetch increments its view counter.
#[utoipa::path(
    get,
    path = "/api/forum/articles/{id}",
    responses(
        (status = 200, description = "Article detail", body = ArticleDetail),
        (status = 404, description = "Unknown or unapproved article", body = Error)
    ),
    tags = ["forum"]
)]
#[get("/articles/{id}")]
pub async fn get_article(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ArticleDetail>> {
    let detail = state
        .articles
        .detail(path.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("Article not found"))?;
    Ok(web::Json(detail))
}

/// Publish an article, with or without a login.
#[utoipa::path(
    post,
    path = "/api/forum/articles",
    request_body = ArticleRequest,
    responses(
        (status = 201, description = "Article created"),
        (status = 400, description = "Missing fields", body = Error)
    ),
    tags = ["forum"]
)]
#[post("/articles")]
pub async fn create_article(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<ArticleRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let (Some(title), Some(content)) = (
        payload.title.filter(|t| !t.trim().is_empty()),
        payload.content.filter(|c| !c.trim().is_empty()),
    ) else {
        return Err(Error::invalid_request("Title and content are required"));
    };

    let author = auth.resolve_author(payload.anonymous_author.as_deref(), ANONYMOUS_AUTHOR);
    let article = state
        .articles
        .create(NewArticle {
            title,
            content,
            excerpt: payload.excerpt,
            cover_image: payload.cover_image,
            tags: payload.tags.unwrap_or_default(),
            author,
            status: state.policy.initial_content_status(),
        })
        .await?;
    tracing::info!(article_id = %article.id, "article published");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Article created successfully",
        "article": {
            "id": article.id,
            "title": article.title,
            "excerpt": article.excerpt,
            "tags": article.tags,
            "created_at": article.created_at,
        },
    })))
}

/// Load an article and check the caller may manage it.
///
/// Anonymous-authored articles resolve to admin-only management.
async fn managed_article(
    state: &HttpState,
    auth: &AuthContext,
    id: Uuid,
) -> Result<(Article, User), Error> {
    let user = current_user(state, auth).await?;
    let article = state
        .articles
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("Article not found"))?;
    let is_author = article.author == Author::Authenticated(user.id);
    if !is_author && !user.is_admin() {
        return Err(Error::forbidden("Access denied"));
    }
    Ok((article, user))
}

/// Update an article; author or admin.
#[utoipa::path(
    put,
    path = "/api/forum/articles/{id}",
    request_body = ArticleRequest,
    responses(
        (status = 200, description = "Article updated"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown article", body = Error)
    ),
    tags = ["forum"]
)]
#[put("/articles/{id}")]
pub async fn update_article(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<ArticleRequest>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    managed_article(&state, &auth, id).await?;

    let payload = payload.into_inner();
    let article = state
        .articles
        .update(
            id,
            ArticleUpdate {
                title: payload.title,
                content: payload.content,
                excerpt: payload.excerpt,
                cover_image: payload.cover_image.map(Some),
                tags: payload.tags,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Article updated successfully",
        "article": {
            "id": article.id,
            "title": article.title,
            "excerpt": article.excerpt,
            "tags": article.tags,
        },
    })))
}

/// Delete an article and its comments; author or admin.
#[utoipa::path(
    delete,
    path = "/api/forum/articles/{id}",
    responses(
        (status = 200, description = "Article deleted"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown article", body = Error)
    ),
    tags = ["forum"]
)]
#[delete("/articles/{id}")]
pub async fn delete_article(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    managed_article(&state, &auth, id).await?;
    state.articles.delete(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Article deleted successfully",
    })))
}

/// Moderation shortcut for articles, equivalent to the moderation namespace.
#[utoipa::path(
    post,
    path = "/api/forum/articles/{id}/moderate",
    request_body = ModerateRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Invalid status", body = Error),
        (status = 403, description = "Admin role required", body = Error)
    ),
    tags = ["forum"]
)]
#[post("/articles/{id}/moderate")]
pub async fn moderate_article(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<ModerateRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &auth).await?;
    let status = ModerationStatus::parse(payload.status.as_deref().unwrap_or_default())?;
    let article = state
        .articles
        .set_status(path.into_inner(), status)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Article status updated",
        "article": article,
    })))
}

/// Comment on an article, with or without a login.
#[utoipa::path(
    post,
    path = "/api/forum/articles/{id}/comments",
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created"),
        (status = 400, description = "Missing text", body = Error),
        (status = 404, description = "Unknown article", body = Error)
    ),
    tags = ["forum"]
)]
#[post("/articles/{id}/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let Some(text) = payload.text.filter(|t| !t.trim().is_empty()) else {
        return Err(Error::invalid_request("Comment text is required"));
    };

    let author = auth.resolve_author(payload.anonymous_name.as_deref(), ANONYMOUS_USER);
    let comment = state
        .comments
        .create(NewComment {
            article_id: path.into_inner(),
            author,
            text,
            status: state.policy.initial_content_status(),
        })
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Comment created successfully",
        "comment": comment,
    })))
}

/// Load a comment and check the caller may manage it.
async fn managed_comment(
    state: &HttpState,
    auth: &AuthContext,
    id: Uuid,
) -> Result<(Comment, User), Error> {
    let user = current_user(state, auth).await?;
    let comment = state
        .comments
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("Comment not found"))?;
    let is_author = comment.author == Author::Authenticated(user.id);
    if !is_author && !user.is_admin() {
        return Err(Error::forbidden("Access denied"));
    }
    Ok((comment, user))
}

/// Fetch one of the caller's comments.
#[utoipa::path(
    get,
    path = "/api/forum/comments/{id}",
    responses(
        (status = 200, description = "Comment"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown comment", body = Error)
    ),
    tags = ["forum"]
)]
#[get("/comments/{id}")]
pub async fn get_comment(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    managed_comment(&state, &auth, id).await?;
    let view = state
        .comments
        .view(id)
        .await?
        .ok_or_else(|| Error::not_found("Comment not found"))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "comment": view })))
}

/// Update a comment; author or admin.
#[utoipa::path(
    put,
    path = "/api/forum/comments/{id}",
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown comment", body = Error)
    ),
    tags = ["forum"]
)]
#[put("/comments/{id}")]
pub async fn update_comment(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<CommentRequest>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    managed_comment(&state, &auth, id).await?;

    let Some(text) = payload.into_inner().text.filter(|t| !t.trim().is_empty()) else {
        return Err(Error::invalid_request("Comment text is required"));
    };
    let view = state.comments.update_text(id, text).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment updated successfully",
        "comment": view,
    })))
}

/// Delete a comment; author or admin.
#[utoipa::path(
    delete,
    path = "/api/forum/comments/{id}",
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown comment", body = Error)
    ),
    tags = ["forum"]
)]
#[delete("/comments/{id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    managed_comment(&state, &auth, id).await?;
    state.comments.delete(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment deleted successfully",
    })))
}

/// Distinct sorted tags across approved articles.
#[utoipa::path(
    get,
    path = "/api/forum/tags",
    responses((status = 200, description = "Tag names", body = [String])),
    tags = ["forum"]
)]
#[get("/tags")]
pub async fn list_tags(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<String>>> {
    Ok(web::Json(state.articles.tags().await?))
}

/// Mount the forum endpoints.
pub fn scope() -> actix_web::Scope {
    web::scope("/forum")
        .service(list_tags)
        .service(list_articles)
        .service(create_article)
        .service(moderate_article)
        .service(create_comment)
        .service(get_article)
        .service(update_article)
        .service(delete_article)
        .service(get_comment)
        .service(update_comment)
        .service(delete_comment)
}
