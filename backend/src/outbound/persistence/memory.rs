//! In-memory implementation of every storage port.
//!
//! Backs the handler test suites and the no-database dev mode. Observable
//! semantics match the Diesel adapters: rating recomputation happens under
//! the same lock as the triggering write, cascades remove dependent rows,
//! and listings order the same way.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use pagination::{Page, PageRequest, paginate};
use uuid::Uuid;

use crate::domain::ports::{
    ArticleRepository, CommentRepository, CompanyRepository, HealthProbe, ReviewRepository,
    UserRepository,
};
use crate::domain::{
    ANONYMOUS_AUTHOR, ANONYMOUS_USER, Article, ArticleDetail, ArticleFilter, ArticleUpdate,
    ArticleView, Author, AuthorView, Comment, CommentView, Company, CompanyDetail, CompanyFilter,
    CompanySummary, CompanyUpdate, Error, ModerationStatus, NewArticle, NewComment, NewCompany,
    NewReview, NewUser, ProfileUpdate, Review, ReviewUpdate, ReviewView, User, derive_excerpt,
    rating,
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    companies: HashMap<Uuid, Company>,
    reviews: HashMap<Uuid, Review>,
    articles: HashMap<Uuid, Article>,
    comments: HashMap<Uuid, Comment>,
}

/// Shared in-memory store implementing all storage ports.
///
/// Cloning is cheap; clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, Error> {
        self.inner
            .read()
            .map_err(|_| Error::internal("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, Error> {
        self.inner
            .write()
            .map_err(|_| Error::internal("in-memory store lock poisoned"))
    }
}

fn matches(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_opt(haystack: Option<&String>, needle: &str) -> bool {
    haystack.is_some_and(|value| matches(value, needle))
}

impl Inner {
    fn author_view(&self, author: &Author, default: &str) -> AuthorView {
        match author {
            Author::Authenticated(id) => match self.users.get(id) {
                Some(user) => AuthorView::registered(user.id, user.name.clone(), user.avatar.clone()),
                // The account was deleted out from under the content.
                None => AuthorView::anonymous(default),
            },
            Author::Anonymous(name) => AuthorView::anonymous(name.clone()),
        }
    }

    fn review_view(&self, review: &Review, with_company: bool) -> ReviewView {
        let author = self.author_view(&Author::Authenticated(review.user_id), ANONYMOUS_USER);
        let company = with_company.then(|| {
            self.companies
                .get(&review.company_id)
                .map(|company| CompanySummary {
                    id: company.id,
                    name: company.name.clone(),
                    category: company.category.clone(),
                })
        });
        ReviewView {
            id: review.id,
            rating: review.rating,
            text: review.text.clone(),
            photos: review.photos.clone(),
            status: review.status,
            created_at: review.created_at,
            author,
            company: company.flatten(),
        }
    }

    fn article_view(&self, article: &Article) -> ArticleView {
        let comment_count = self
            .comments
            .values()
            .filter(|comment| comment.article_id == article.id)
            .count() as i64;
        ArticleView {
            id: article.id,
            title: article.title.clone(),
            excerpt: article.excerpt.clone(),
            cover_image: article.cover_image.clone(),
            tags: article.tags.clone(),
            status: article.status,
            views: article.views,
            author: self.author_view(&article.author, ANONYMOUS_AUTHOR),
            created_at: article.created_at,
            comment_count,
        }
    }

    fn comment_view(&self, comment: &Comment) -> CommentView {
        CommentView {
            id: comment.id,
            text: comment.text.clone(),
            status: comment.status,
            created_at: comment.created_at,
            author: self.author_view(&comment.author, ANONYMOUS_USER),
        }
    }

    /// Re-derive one company's aggregate from its approved reviews.
    fn recompute_rating(&mut self, company_id: Uuid) {
        let ratings: Vec<i32> = self
            .reviews
            .values()
            .filter(|review| {
                review.company_id == company_id && review.status == ModerationStatus::Approved
            })
            .map(|review| review.rating)
            .collect();
        let summary = rating::aggregate(&ratings);
        if let Some(company) = self.companies.get_mut(&company_id) {
            company.rating = summary.rating;
            company.review_count = summary.review_count;
        }
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> Result<(), Error> {
        self.read().map(|_| ())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, Error> {
        let mut inner = self.write()?;
        if inner
            .users
            .values()
            .any(|existing| existing.email == user.email)
        {
            return Err(Error::conflict("User already exists"));
        }
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            avatar: None,
            created_at: Utc::now(),
        };
        inner.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let inner = self.read()?;
        Ok(inner
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, Error> {
        let mut inner = self.write()?;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("User not found"))?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        Ok(user.clone())
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn list(&self, filter: &CompanyFilter, page: PageRequest) -> Result<Page<Company>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<Company> = inner
            .companies
            .values()
            .filter(|company| match filter.owner_id {
                Some(owner) => company.owner_id == owner,
                None => company.status == ModerationStatus::Approved,
            })
            .filter(|company| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|category| &company.category == category)
            })
            .filter(|company| filter.city.as_ref().is_none_or(|city| &company.city == city))
            .filter(|company| {
                filter.search.as_deref().is_none_or(|term| {
                    matches(&company.name, term)
                        || matches(&company.category, term)
                        || matches(&company.city, term)
                        || matches_opt(company.description.as_ref(), term)
                })
            })
            .filter(|company| {
                filter
                    .min_rating
                    .is_none_or(|floor| company.rating >= floor)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(paginate(rows, page))
    }

    async fn detail(&self, id: Uuid) -> Result<Option<CompanyDetail>, Error> {
        let inner = self.read()?;
        let Some(company) = inner.companies.get(&id) else {
            return Ok(None);
        };
        if company.status != ModerationStatus::Approved {
            return Ok(None);
        }
        let owner = inner.users.get(&company.owner_id).map(User::summary);
        let mut reviews: Vec<&Review> = inner
            .reviews
            .values()
            .filter(|review| {
                review.company_id == id && review.status == ModerationStatus::Approved
            })
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let reviews = reviews
            .into_iter()
            .take(10)
            .map(|review| inner.review_view(review, false))
            .collect();
        Ok(Some(CompanyDetail {
            company: company.clone(),
            owner,
            reviews,
        }))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Company>, Error> {
        Ok(self.read()?.companies.get(&id).cloned())
    }

    async fn create(&self, company: NewCompany) -> Result<Company, Error> {
        let mut inner = self.write()?;
        let now = Utc::now();
        let row = Company {
            id: Uuid::new_v4(),
            name: company.name,
            category: company.category,
            city: company.city,
            status: company.status,
            address: company.address,
            phone: company.phone,
            website: company.website,
            description: company.description,
            logo: company.logo,
            rating: 0.0,
            review_count: 0,
            owner_id: company.owner_id,
            created_at: now,
            updated_at: now,
        };
        inner.companies.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: CompanyUpdate) -> Result<Company, Error> {
        let mut inner = self.write()?;
        let company = inner
            .companies
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Company not found"))?;
        if let Some(name) = update.name {
            company.name = name;
        }
        if let Some(category) = update.category {
            company.category = category;
        }
        if let Some(city) = update.city {
            company.city = city;
        }
        if let Some(address) = update.address {
            company.address = address;
        }
        if let Some(phone) = update.phone {
            company.phone = phone;
        }
        if let Some(website) = update.website {
            company.website = website;
        }
        if let Some(description) = update.description {
            company.description = description;
        }
        if let Some(logo) = update.logo {
            company.logo = logo;
        }
        company.updated_at = Utc::now();
        Ok(company.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut inner = self.write()?;
        if inner.companies.remove(&id).is_none() {
            return Err(Error::not_found("Company not found"));
        }
        inner.reviews.retain(|_, review| review.company_id != id);
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<String>, Error> {
        let inner = self.read()?;
        let mut values: Vec<String> = inner
            .companies
            .values()
            .map(|company| company.category.clone())
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }

    async fn cities(&self) -> Result<Vec<String>, Error> {
        let inner = self.read()?;
        let mut values: Vec<String> = inner
            .companies
            .values()
            .map(|company| company.city.clone())
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<Company, Error> {
        let mut inner = self.write()?;
        let company = inner
            .companies
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Company not found"))?;
        company.status = status;
        company.updated_at = Utc::now();
        Ok(company.clone())
    }

    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<Company>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<Company> = inner
            .companies
            .values()
            .filter(|company| company.status == status)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(rows, page))
    }

    async fn names_matching(&self, term: &str, limit: u32) -> Result<Vec<Company>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<Company> = inner
            .companies
            .values()
            .filter(|company| {
                company.status == ModerationStatus::Approved && matches(&company.name, term)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn categories_matching(&self, term: &str, limit: u32) -> Result<Vec<String>, Error> {
        let inner = self.read()?;
        let mut values: Vec<String> = inner
            .companies
            .values()
            .filter(|company| {
                company.status == ModerationStatus::Approved && matches(&company.category, term)
            })
            .map(|company| company.category.clone())
            .collect();
        values.sort();
        values.dedup();
        values.truncate(limit as usize);
        Ok(values)
    }

    async fn cities_matching(&self, term: &str, limit: u32) -> Result<Vec<String>, Error> {
        let inner = self.read()?;
        let mut values: Vec<String> = inner
            .companies
            .values()
            .filter(|company| {
                company.status == ModerationStatus::Approved && matches(&company.city, term)
            })
            .map(|company| company.city.clone())
            .collect();
        values.sort();
        values.dedup();
        values.truncate(limit as usize);
        Ok(values)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create(&self, review: NewReview) -> Result<ReviewView, Error> {
        let mut inner = self.write()?;
        if !inner.companies.contains_key(&review.company_id) {
            return Err(Error::not_found("Company not found"));
        }
        if inner.reviews.values().any(|existing| {
            existing.company_id == review.company_id && existing.user_id == review.user_id
        }) {
            return Err(Error::conflict("You have already reviewed this company"));
        }
        let row = Review {
            id: Uuid::new_v4(),
            company_id: review.company_id,
            user_id: review.user_id,
            rating: review.rating,
            text: review.text,
            photos: review.photos,
            status: review.status,
            created_at: Utc::now(),
        };
        inner.reviews.insert(row.id, row.clone());
        inner.recompute_rating(row.company_id);
        Ok(inner.review_view(&row, false))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Review>, Error> {
        Ok(self.read()?.reviews.get(&id).cloned())
    }

    async fn view(&self, id: Uuid) -> Result<Option<ReviewView>, Error> {
        let inner = self.read()?;
        Ok(inner
            .reviews
            .get(&id)
            .map(|review| inner.review_view(review, true)))
    }

    async fn update(&self, id: Uuid, update: ReviewUpdate) -> Result<ReviewView, Error> {
        let mut inner = self.write()?;
        let review = inner
            .reviews
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Review not found"))?;
        if let Some(rating) = update.rating {
            review.rating = rating;
        }
        if let Some(text) = update.text {
            review.text = text;
        }
        if let Some(photos) = update.photos {
            review.photos = photos;
        }
        let row = review.clone();
        inner.recompute_rating(row.company_id);
        Ok(inner.review_view(&row, true))
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut inner = self.write()?;
        let review = inner
            .reviews
            .remove(&id)
            .ok_or_else(|| Error::not_found("Review not found"))?;
        inner.recompute_rating(review.company_id);
        Ok(())
    }

    async fn list_for_company(
        &self,
        company_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<&Review> = inner
            .reviews
            .values()
            .filter(|review| {
                review.company_id == company_id && review.status == ModerationStatus::Approved
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let views: Vec<ReviewView> = rows
            .into_iter()
            .map(|review| inner.review_view(review, false))
            .collect();
        Ok(paginate(views, page))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<&Review> = inner
            .reviews
            .values()
            .filter(|review| review.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let views: Vec<ReviewView> = rows
            .into_iter()
            .map(|review| inner.review_view(review, true))
            .collect();
        Ok(paginate(views, page))
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<ReviewView, Error> {
        let mut inner = self.write()?;
        let review = inner
            .reviews
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Review not found"))?;
        review.status = status;
        let row = review.clone();
        inner.recompute_rating(row.company_id);
        Ok(inner.review_view(&row, true))
    }

    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<ReviewView>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<&Review> = inner
            .reviews
            .values()
            .filter(|review| review.status == status)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let views: Vec<ReviewView> = rows
            .into_iter()
            .map(|review| inner.review_view(review, true))
            .collect();
        Ok(paginate(views, page))
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<ReviewView>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<&Review> = inner
            .reviews
            .values()
            .filter(|review| {
                review.status == ModerationStatus::Approved
                    && matches_opt(review.text.as_ref(), term)
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let views: Vec<ReviewView> = rows
            .into_iter()
            .map(|review| inner.review_view(review, true))
            .collect();
        Ok(paginate(views, page))
    }
}

#[async_trait]
impl ArticleRepository for MemoryStore {
    async fn list(
        &self,
        filter: &ArticleFilter,
        page: PageRequest,
    ) -> Result<Page<ArticleView>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<&Article> = inner
            .articles
            .values()
            .filter(|article| article.status == ModerationStatus::Approved)
            .filter(|article| {
                filter
                    .tag
                    .as_deref()
                    .is_none_or(|tag| article.tags.iter().any(|candidate| candidate == tag))
            })
            .filter(|article| {
                filter.search.as_deref().is_none_or(|term| {
                    matches(&article.title, term)
                        || matches(&article.content, term)
                        || matches(&article.excerpt, term)
                        || article.tags.iter().any(|tag| matches(tag, term))
                })
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let views: Vec<ArticleView> = rows
            .into_iter()
            .map(|article| inner.article_view(article))
            .collect();
        Ok(paginate(views, page))
    }

    async fn detail(&self, id: Uuid) -> Result<Option<ArticleDetail>, Error> {
        let mut inner = self.write()?;
        let Some(article) = inner.articles.get_mut(&id) else {
            return Ok(None);
        };
        if article.status != ModerationStatus::Approved {
            return Ok(None);
        }
        article.views += 1;
        let article = article.clone();
        let mut comments: Vec<&Comment> = inner
            .comments
            .values()
            .filter(|comment| {
                comment.article_id == id && comment.status == ModerationStatus::Approved
            })
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let comments = comments
            .into_iter()
            .map(|comment| inner.comment_view(comment))
            .collect();
        Ok(Some(ArticleDetail {
            id: article.id,
            title: article.title.clone(),
            content: article.content.clone(),
            excerpt: article.excerpt.clone(),
            cover_image: article.cover_image.clone(),
            tags: article.tags.clone(),
            status: article.status,
            views: article.views,
            author: inner.author_view(&article.author, ANONYMOUS_AUTHOR),
            comments,
            created_at: article.created_at,
            updated_at: article.updated_at,
        }))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Article>, Error> {
        Ok(self.read()?.articles.get(&id).cloned())
    }

    async fn create(&self, article: NewArticle) -> Result<Article, Error> {
        let mut inner = self.write()?;
        let now = Utc::now();
        let excerpt = article
            .excerpt
            .unwrap_or_else(|| derive_excerpt(&article.content));
        let row = Article {
            id: Uuid::new_v4(),
            title: article.title,
            content: article.content,
            excerpt,
            cover_image: article.cover_image,
            tags: article.tags,
            status: article.status,
            author: article.author,
            views: 0,
            created_at: now,
            updated_at: now,
        };
        inner.articles.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: ArticleUpdate) -> Result<Article, Error> {
        let mut inner = self.write()?;
        let article = inner
            .articles
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Article not found"))?;
        if let Some(title) = update.title {
            article.title = title;
        }
        if let Some(content) = update.content {
            article.excerpt = update
                .excerpt
                .clone()
                .unwrap_or_else(|| derive_excerpt(&content));
            article.content = content;
        } else if let Some(excerpt) = update.excerpt {
            article.excerpt = excerpt;
        }
        if let Some(cover_image) = update.cover_image {
            article.cover_image = cover_image;
        }
        if let Some(tags) = update.tags {
            article.tags = tags;
        }
        article.updated_at = Utc::now();
        Ok(article.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut inner = self.write()?;
        if inner.articles.remove(&id).is_none() {
            return Err(Error::not_found("Article not found"));
        }
        inner.comments.retain(|_, comment| comment.article_id != id);
        Ok(())
    }

    async fn tags(&self) -> Result<Vec<String>, Error> {
        let inner = self.read()?;
        let mut tags: Vec<String> = inner
            .articles
            .values()
            .filter(|article| article.status == ModerationStatus::Approved)
            .flat_map(|article| article.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<ArticleView, Error> {
        let mut inner = self.write()?;
        let article = inner
            .articles
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Article not found"))?;
        article.status = status;
        article.updated_at = Utc::now();
        let row = article.clone();
        Ok(inner.article_view(&row))
    }

    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<ArticleView>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<&Article> = inner
            .articles
            .values()
            .filter(|article| article.status == status)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let views: Vec<ArticleView> = rows
            .into_iter()
            .map(|article| inner.article_view(article))
            .collect();
        Ok(paginate(views, page))
    }

    async fn search(&self, term: &str, page: PageRequest) -> Result<Page<ArticleView>, Error> {
        let filter = ArticleFilter {
            tag: None,
            search: Some(term.to_owned()),
        };
        ArticleRepository::list(self, &filter, page).await
    }

    async fn titles_matching(&self, term: &str, limit: u32) -> Result<Vec<ArticleView>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<&Article> = inner
            .articles
            .values()
            .filter(|article| {
                article.status == ModerationStatus::Approved && matches(&article.title, term)
            })
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows
            .into_iter()
            .take(limit as usize)
            .map(|article| inner.article_view(article))
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: NewComment) -> Result<CommentView, Error> {
        let mut inner = self.write()?;
        if !inner.articles.contains_key(&comment.article_id) {
            return Err(Error::not_found("Article not found"));
        }
        let row = Comment {
            id: Uuid::new_v4(),
            article_id: comment.article_id,
            author: comment.author,
            text: comment.text,
            status: comment.status,
            created_at: Utc::now(),
        };
        inner.comments.insert(row.id, row.clone());
        Ok(inner.comment_view(&row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, Error> {
        Ok(self.read()?.comments.get(&id).cloned())
    }

    async fn view(&self, id: Uuid) -> Result<Option<CommentView>, Error> {
        let inner = self.read()?;
        Ok(inner
            .comments
            .get(&id)
            .map(|comment| inner.comment_view(comment)))
    }

    async fn update_text(&self, id: Uuid, text: String) -> Result<CommentView, Error> {
        let mut inner = self.write()?;
        let comment = inner
            .comments
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Comment not found"))?;
        comment.text = text;
        let row = comment.clone();
        Ok(inner.comment_view(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let mut inner = self.write()?;
        inner
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Comment not found"))
    }

    async fn set_status(&self, id: Uuid, status: ModerationStatus) -> Result<CommentView, Error> {
        let mut inner = self.write()?;
        let comment = inner
            .comments
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Comment not found"))?;
        comment.status = status;
        let row = comment.clone();
        Ok(inner.comment_view(&row))
    }

    async fn queue(
        &self,
        status: ModerationStatus,
        page: PageRequest,
    ) -> Result<Page<CommentView>, Error> {
        let inner = self.read()?;
        let mut rows: Vec<&Comment> = inner
            .comments
            .values()
            .filter(|comment| comment.status == status)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let views: Vec<CommentView> = rows
            .into_iter()
            .map(|comment| inner.comment_view(comment))
            .collect();
        Ok(paginate(views, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use rstest::rstest;

    async fn seed_user(store: &MemoryStore, email: &str) -> User {
        UserRepository::create(
            store,
            NewUser {
                email: email.to_owned(),
                password_hash: "$argon2id$fixture".to_owned(),
                name: email.split('@').next().unwrap_or("user").to_owned(),
                role: UserRole::User,
            },
        )
        .await
        .expect("user created")
    }

    async fn seed_company(store: &MemoryStore, owner: Uuid, status: ModerationStatus) -> Company {
        CompanyRepository::create(
            store,
            NewCompany {
                name: "Corner Bakery".to_owned(),
                category: "Food".to_owned(),
                city: "Leeds".to_owned(),
                address: None,
                phone: None,
                website: None,
                description: Some("fresh bread daily".to_owned()),
                logo: None,
                owner_id: owner,
                status,
            },
        )
        .await
        .expect("company created")
    }

    async fn seed_review(store: &MemoryStore, company: Uuid, user: Uuid, stars: i32) -> ReviewView {
        ReviewRepository::create(
            store,
            NewReview {
                company_id: company,
                user_id: user,
                rating: stars,
                text: None,
                photos: Vec::new(),
                status: ModerationStatus::Approved,
            },
        )
        .await
        .expect("review created")
    }

    async fn company_rating(store: &MemoryStore, id: Uuid) -> (f64, i64) {
        let company = CompanyRepository::get(store, id)
            .await
            .expect("lookup succeeds")
            .expect("company exists");
        (company.rating, company.review_count)
    }

    #[rstest]
    #[tokio::test]
    async fn rating_follows_the_approved_set() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.net").await;
        let u1 = seed_user(&store, "u1@example.net").await;
        let u2 = seed_user(&store, "u2@example.net").await;
        let company = seed_company(&store, owner.id, ModerationStatus::Approved).await;

        assert_eq!(company_rating(&store, company.id).await, (0.0, 0));

        let first = seed_review(&store, company.id, u1.id, 5).await;
        assert_eq!(company_rating(&store, company.id).await, (5.0, 1));

        seed_review(&store, company.id, u2.id, 3).await;
        assert_eq!(company_rating(&store, company.id).await, (4.0, 2));

        ReviewRepository::delete(&store, first.id)
            .await
            .expect("review deleted");
        assert_eq!(company_rating(&store, company.id).await, (3.0, 1));
    }

    #[rstest]
    #[tokio::test]
    async fn moderating_a_review_recomputes_the_aggregate() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.net").await;
        let u1 = seed_user(&store, "u1@example.net").await;
        let u2 = seed_user(&store, "u2@example.net").await;
        let company = seed_company(&store, owner.id, ModerationStatus::Approved).await;

        let first = seed_review(&store, company.id, u1.id, 5).await;
        seed_review(&store, company.id, u2.id, 1).await;
        assert_eq!(company_rating(&store, company.id).await, (3.0, 2));

        ReviewRepository::set_status(&store, first.id, ModerationStatus::Rejected)
            .await
            .expect("status written");
        assert_eq!(company_rating(&store, company.id).await, (1.0, 1));

        ReviewRepository::set_status(&store, first.id, ModerationStatus::Approved)
            .await
            .expect("status written");
        assert_eq!(company_rating(&store, company.id).await, (3.0, 2));
    }

    #[rstest]
    #[tokio::test]
    async fn second_review_for_the_same_pair_conflicts() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.net").await;
        let reviewer = seed_user(&store, "reviewer@example.net").await;
        let company = seed_company(&store, owner.id, ModerationStatus::Approved).await;

        seed_review(&store, company.id, reviewer.id, 4).await;
        let error = ReviewRepository::create(
            &store,
            NewReview {
                company_id: company.id,
                user_id: reviewer.id,
                rating: 2,
                text: None,
                photos: Vec::new(),
                status: ModerationStatus::Approved,
            },
        )
        .await
        .expect_err("duplicate rejected");
        assert_eq!(error.code, crate::domain::ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_company_removes_its_reviews() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.net").await;
        let reviewer = seed_user(&store, "reviewer@example.net").await;
        let company = seed_company(&store, owner.id, ModerationStatus::Approved).await;
        let review = seed_review(&store, company.id, reviewer.id, 4).await;

        CompanyRepository::delete(&store, company.id)
            .await
            .expect("company deleted");
        assert!(
            ReviewRepository::get(&store, review.id)
                .await
                .expect("lookup succeeds")
                .is_none()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_an_article_removes_its_comments() {
        let store = MemoryStore::new();
        let article = ArticleRepository::create(
            &store,
            NewArticle {
                title: "Opening week".to_owned(),
                content: "body".to_owned(),
                excerpt: None,
                cover_image: None,
                tags: Vec::new(),
                author: Author::Anonymous("Drifter".to_owned()),
                status: ModerationStatus::Approved,
            },
        )
        .await
        .expect("article created");
        let comment = CommentRepository::create(
            &store,
            NewComment {
                article_id: article.id,
                author: Author::Anonymous("Drifter".to_owned()),
                text: "first".to_owned(),
                status: ModerationStatus::Approved,
            },
        )
        .await
        .expect("comment created");

        ArticleRepository::delete(&store, article.id)
            .await
            .expect("article deleted");
        assert!(
            CommentRepository::get(&store, comment.id)
                .await
                .expect("lookup succeeds")
                .is_none()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn pending_companies_stay_out_of_public_listings() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.net").await;
        let company = seed_company(&store, owner.id, ModerationStatus::Pending).await;

        let page = CompanyRepository::list(&store, &CompanyFilter::default(), PageRequest::default())
            .await
            .expect("listing succeeds");
        assert!(page.items.is_empty());

        let mine = CompanyRepository::list(
            &store,
            &CompanyFilter {
                owner_id: Some(owner.id),
                ..CompanyFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .expect("listing succeeds");
        assert_eq!(mine.items.len(), 1);
        assert_eq!(mine.items[0].id, company.id);
    }

    #[rstest]
    #[tokio::test]
    async fn detail_fetch_increments_the_view_counter() {
        let store = MemoryStore::new();
        let article = ArticleRepository::create(
            &store,
            NewArticle {
                title: "Counted".to_owned(),
                content: "body".to_owned(),
                excerpt: None,
                cover_image: None,
                tags: Vec::new(),
                author: Author::Anonymous("Drifter".to_owned()),
                status: ModerationStatus::Approved,
            },
        )
        .await
        .expect("article created");

        for expected in 1..=3 {
            let detail = ArticleRepository::detail(&store, article.id)
                .await
                .expect("detail succeeds")
                .expect("article visible");
            assert_eq!(detail.views, expected);
        }
    }
}
