//! OpenAPI document aggregation, served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{
    ArticleDetail, ArticleView, AuthorView, CommentView, Company, CompanyDetail, CompanySummary,
    Error, ErrorCode, ModerationStatus, ReviewView, UserProfile, UserRole, UserSummary,
};
use crate::inbound::http;

/// Aggregated OpenAPI description of the REST surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        http::users::register,
        http::users::login,
        http::users::get_profile,
        http::users::update_profile,
        http::catalog::list_companies,
        http::catalog::get_company,
        http::catalog::create_company,
        http::catalog::update_company,
        http::catalog::delete_company,
        http::catalog::list_categories,
        http::catalog::list_cities,
        http::reviews::create_review,
        http::reviews::get_review,
        http::reviews::update_review,
        http::reviews::delete_review,
        http::reviews::company_reviews,
        http::reviews::user_reviews,
        http::forum::list_articles,
        http::forum::get_article,
        http::forum::create_article,
        http::forum::update_article,
        http::forum::delete_article,
        http::forum::moderate_article,
        http::forum::create_comment,
        http::forum::get_comment,
        http::forum::update_comment,
        http::forum::delete_comment,
        http::forum::list_tags,
        http::moderation::company_queue,
        http::moderation::review_queue,
        http::moderation::article_queue,
        http::moderation::comment_queue,
        http::moderation::moderate_company,
        http::moderation::moderate_review,
        http::moderation::moderate_article,
        http::moderation::moderate_comment,
        http::search::global_search,
        http::search::suggestions,
        http::uploads::upload_file,
        http::uploads::upload_photos,
        http::health::health,
    ),
    components(schemas(
        Error,
        ErrorCode,
        ModerationStatus,
        UserRole,
        UserProfile,
        UserSummary,
        AuthorView,
        Company,
        CompanySummary,
        CompanyDetail,
        ReviewView,
        ArticleView,
        ArticleDetail,
        CommentView,
    )),
    tags(
        (name = "auth", description = "Registration, login, and profiles"),
        (name = "catalog", description = "Company directory"),
        (name = "reviews", description = "Company reviews and ratings"),
        (name = "forum", description = "Articles and comments"),
        (name = "moderation", description = "Admin queues and status transitions"),
        (name = "search", description = "Global search and autocomplete"),
        (name = "uploads", description = "Image uploads"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
