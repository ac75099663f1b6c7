//! Company catalog endpoints.
//!
//! ```text
//! GET    /api/catalog              list with filters and pagination
//! GET    /api/catalog/categories   distinct category facet
//! GET    /api/catalog/cities       distinct city facet
//! GET    /api/catalog/{id}         detail with owner and latest reviews
//! POST   /api/catalog              create (authenticated; enters moderation)
//! PUT    /api/catalog/{id}         update (owner only)
//! DELETE /api/catalog/{id}         delete (owner only; reviews cascade)
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{PageInfo, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    ApiResult, Company, CompanyDetail, CompanyFilter, CompanyUpdate, Error, NewCompany,
};

use super::auth::AuthContext;
use super::state::HttpState;

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Exact category filter.
    pub category: Option<String>,
    /// Exact city filter.
    pub city: Option<String>,
    /// Substring search over name, category, city, and description.
    pub search: Option<String>,
    /// Minimum aggregate rating.
    pub rating: Option<f64>,
    /// List one owner's companies regardless of status.
    pub owner_id: Option<Uuid>,
}

/// Paginated catalog envelope.
#[derive(Debug, Serialize)]
pub struct CompanyListResponse {
    /// Companies in the requested window.
    pub companies: Vec<Company>,
    /// Pagination envelope.
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Company create/update request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompanyRequest {
    /// Business name.
    pub name: Option<String>,
    /// Category facet.
    pub category: Option<String>,
    /// City facet.
    pub city: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Website URL.
    pub website: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Logo image URL.
    pub logo: Option<String>,
}

/// Treat blank strings as absent, like an empty form field.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// List companies ordered by rating.
#[utoipa::path(
    get,
    path = "/api/catalog",
    responses((status = 200, description = "Paginated companies")),
    tags = ["catalog"]
)]
#[get("")]
pub async fn list_companies(
    state: web::Data<HttpState>,
    query: web::Query<CatalogQuery>,
) -> ApiResult<web::Json<CompanyListResponse>> {
    let query = query.into_inner();
    let page = PageRequest::from_params(query.page, query.per_page);
    let filter = CompanyFilter {
        category: clean(query.category),
        city: clean(query.city),
        search: clean(query.search),
        min_rating: query.rating,
        owner_id: query.owner_id,
    };
    let result = state.companies.list(&filter, page).await?;
    Ok(web::Json(CompanyListResponse {
        companies: result.items,
        page: result.info,
    }))
}

/// Fetch one approved company with owner and latest reviews.
#[utoipa::path(
    get,
    path = "/api/catalog/{id}",
    responses(
        (status = 200, description = "Company detail", body = CompanyDetail),
        (status = 404, description = "Unknown or unapproved company", body = Error)
    ),
    tags = ["catalog"]
)]
#[get("/{id}")]
pub async fn get_company(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CompanyDetail>> {
    let detail = state
        .companies
        .detail(path.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("Company not found"))?;
    Ok(web::Json(detail))
}

/// Create a listing; it waits in the moderation queue before going public.
#[utoipa::path(
    post,
    path = "/api/catalog",
    request_body = CompanyRequest,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Missing fields", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["catalog"]
)]
#[post("")]
pub async fn create_company(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CompanyRequest>,
) -> ApiResult<HttpResponse> {
    let owner_id = auth.require_user_id()?;
    let payload = payload.into_inner();

    let missing = "Name, category and city are required";
    let (Some(name), Some(category), Some(city)) = (
        clean(payload.name),
        clean(payload.category),
        clean(payload.city),
    ) else {
        return Err(Error::invalid_request(missing));
    };

    let company = state
        .companies
        .create(NewCompany {
            name,
            category,
            city,
            address: clean(payload.address),
            phone: clean(payload.phone),
            website: clean(payload.website),
            description: clean(payload.description),
            logo: clean(payload.logo),
            owner_id,
            status: state.policy.initial_company_status(),
        })
        .await?;
    tracing::info!(company_id = %company.id, %owner_id, "company listed");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Company created successfully",
        "company": company,
    })))
}

/// Update a listing; owner only.
#[utoipa::path(
    put,
    path = "/api/catalog/{id}",
    request_body = CompanyRequest,
    responses(
        (status = 200, description = "Company updated"),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown company", body = Error)
    ),
    tags = ["catalog"]
)]
#[put("/{id}")]
pub async fn update_company(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<CompanyRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = auth.require_user_id()?;
    let id = path.into_inner();

    let company = state
        .companies
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("Company not found"))?;
    if company.owner_id != user_id {
        return Err(Error::forbidden("Access denied"));
    }

    let payload = payload.into_inner();
    let company = state
        .companies
        .update(
            id,
            CompanyUpdate {
                name: clean(payload.name),
                category: clean(payload.category),
                city: clean(payload.city),
                address: payload.address.map(clean_inner),
                phone: payload.phone.map(clean_inner),
                website: payload.website.map(clean_inner),
                description: payload.description.map(clean_inner),
                logo: payload.logo.map(clean_inner),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Company updated successfully",
        "company": company,
    })))
}

/// A present-but-blank field clears the stored value.
fn clean_inner(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Delete a listing and its reviews; owner only.
#[utoipa::path(
    delete,
    path = "/api/catalog/{id}",
    responses(
        (status = 200, description = "Company deleted"),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown company", body = Error)
    ),
    tags = ["catalog"]
)]
#[delete("/{id}")]
pub async fn delete_company(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = auth.require_user_id()?;
    let id = path.into_inner();

    let company = state
        .companies
        .get(id)
        .await?
        .ok_or_else(|| Error::not_found("Company not found"))?;
    if company.owner_id != user_id {
        return Err(Error::forbidden("Access denied"));
    }

    state.companies.delete(id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Company deleted successfully",
    })))
}

/// Distinct category facet values.
#[utoipa::path(
    get,
    path = "/api/catalog/categories",
    responses((status = 200, description = "Category names", body = [String])),
    tags = ["catalog"]
)]
#[get("/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<String>>> {
    Ok(web::Json(state.companies.categories().await?))
}

/// Distinct city facet values.
#[utoipa::path(
    get,
    path = "/api/catalog/cities",
    responses((status = 200, description = "City names", body = [String])),
    tags = ["catalog"]
)]
#[get("/cities")]
pub async fn list_cities(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<String>>> {
    Ok(web::Json(state.companies.cities().await?))
}

/// Mount the catalog endpoints.
///
/// The facet routes register before the `{id}` route so `categories` and
/// `cities` are not swallowed by the id matcher.
pub fn scope() -> actix_web::Scope {
    web::scope("/catalog")
        .service(list_categories)
        .service(list_cities)
        .service(list_companies)
        .service(get_company)
        .service(create_company)
        .service(update_company)
        .service(delete_company)
}
