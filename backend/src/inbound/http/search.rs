//! Global search and autocomplete suggestions.
//!
//! ```text
//! GET /api/search?q=..&type=..&page=..&per_page=..
//! GET /api/search/suggestions?q=..
//! ```
//!
//! Substring matching over approved content only, with per-type pagination.
//! An empty query returns empty buckets rather than an error.

use actix_web::{get, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiResult, ArticleView, Company, Error, ReviewView};

use super::state::HttpState;

/// Minimum query length before suggestions are computed.
const SUGGESTION_MIN_CHARS: usize = 2;

/// Maximum number of suggestions returned.
const SUGGESTION_CAP: usize = 10;

/// Which result buckets a search request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    All,
    Companies,
    Articles,
    Reviews,
}

impl SearchKind {
    fn parse(raw: Option<&str>) -> Result<Self, Error> {
        match raw.unwrap_or_default() {
            "" | "all" => Ok(Self::All),
            "companies" => Ok(Self::Companies),
            "articles" => Ok(Self::Articles),
            "reviews" => Ok(Self::Reviews),
            _ => Err(Error::invalid_request(
                "type must be one of all, companies, articles, reviews",
            )),
        }
    }

    fn wants(self, kind: Self) -> bool {
        self == Self::All || self == kind
    }
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to match.
    pub q: Option<String>,
    /// Bucket filter: `all`, `companies`, `articles`, or `reviews`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Page number, 1-based (applied per bucket).
    pub page: Option<u32>,
    /// Page size (applied per bucket).
    pub per_page: Option<u32>,
}

/// Combined search response.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Matching approved companies, ordered by rating.
    pub companies: Vec<Company>,
    /// Matching approved articles, newest first.
    pub articles: Vec<ArticleView>,
    /// Matching approved reviews, newest first.
    pub reviews: Vec<ReviewView>,
    /// Sum of matches across the requested buckets.
    pub total: u64,
    /// The query that was searched.
    pub query: String,
    /// The page each bucket holds.
    pub current_page: u32,
}

/// One autocomplete suggestion.
#[derive(Debug, Serialize, ToSchema)]
pub struct Suggestion {
    /// Suggested completion text.
    pub text: String,
    /// Suggestion kind: `company`, `article`, `category`, or `city`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Company category, on company suggestions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Company city, on company suggestions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Article author display name, on article suggestions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Suggestions response.
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    /// Up to ten suggestions, companies and articles first.
    pub suggestions: Vec<Suggestion>,
}

/// Search approved companies, articles, and reviews.
#[utoipa::path(
    get,
    path = "/api/search",
    responses((status = 200, description = "Per-type result buckets")),
    tags = ["search"]
)]
#[get("")]
pub async fn global_search(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<SearchResponse>> {
    let query = query.into_inner();
    let page = PageRequest::from_params(query.page, query.per_page);
    let term = query.q.as_deref().unwrap_or_default().trim().to_owned();
    let kind = SearchKind::parse(query.kind.as_deref())?;

    let mut response = SearchResponse {
        companies: Vec::new(),
        articles: Vec::new(),
        reviews: Vec::new(),
        total: 0,
        query: term.clone(),
        current_page: page.page(),
    };
    if term.is_empty() {
        return Ok(web::Json(response));
    }

    if kind.wants(SearchKind::Companies) {
        let filter = crate::domain::CompanyFilter {
            search: Some(term.clone()),
            ..crate::domain::CompanyFilter::default()
        };
        let companies = state.companies.list(&filter, page).await?;
        response.total += companies.info.total;
        response.companies = companies.items;
    }

    if kind.wants(SearchKind::Articles) {
        let articles = state.articles.search(&term, page).await?;
        response.total += articles.info.total;
        response.articles = articles.items;
    }

    if kind.wants(SearchKind::Reviews) {
        let reviews = state.reviews.search(&term, page).await?;
        response.total += reviews.info.total;
        response.reviews = reviews.items;
    }

    Ok(web::Json(response))
}

/// Autocomplete suggestions from company names, article titles, and facets.
#[utoipa::path(
    get,
    path = "/api/search/suggestions",
    responses((status = 200, description = "Up to ten suggestions")),
    tags = ["search"]
)]
#[get("/suggestions")]
pub async fn suggestions(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<SuggestionsResponse>> {
    let term = query
        .into_inner()
        .q
        .unwrap_or_default()
        .trim()
        .to_owned();
    if term.chars().count() < SUGGESTION_MIN_CHARS {
        return Ok(web::Json(SuggestionsResponse {
            suggestions: Vec::new(),
        }));
    }

    let mut suggestions = Vec::new();

    for company in state.companies.names_matching(&term, 5).await? {
        suggestions.push(Suggestion {
            text: company.name,
            kind: "company",
            category: Some(company.category),
            city: Some(company.city),
            author: None,
        });
    }

    for article in state.articles.titles_matching(&term, 5).await? {
        suggestions.push(Suggestion {
            text: article.title,
            kind: "article",
            category: None,
            city: None,
            author: Some(article.author.name),
        });
    }

    for category in state.companies.categories_matching(&term, 3).await? {
        suggestions.push(Suggestion {
            text: category,
            kind: "category",
            category: None,
            city: None,
            author: None,
        });
    }

    for city in state.companies.cities_matching(&term, 3).await? {
        suggestions.push(Suggestion {
            text: city,
            kind: "city",
            category: None,
            city: None,
            author: None,
        });
    }

    suggestions.truncate(SUGGESTION_CAP);
    Ok(web::Json(SuggestionsResponse { suggestions }))
}

/// Mount the search endpoints.
pub fn scope() -> actix_web::Scope {
    web::scope("/search").service(suggestions).service(global_search)
}
