//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the migrations exactly; regenerate with
//! `diesel print-schema` after a migration changes the schema.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Unique login email.
        email -> Varchar,
        /// Argon2id password hash.
        password_hash -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Role: `user` or `admin`.
        role -> Varchar,
        /// Avatar URL.
        avatar -> Nullable<Varchar>,
        /// Account creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Company listings.
    companies (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Business name.
        name -> Varchar,
        /// Category facet.
        category -> Varchar,
        /// City facet.
        city -> Varchar,
        /// Moderation status: `pending`, `approved`, or `rejected`.
        status -> Varchar,
        /// Street address.
        address -> Nullable<Varchar>,
        /// Contact phone number.
        phone -> Nullable<Varchar>,
        /// Website URL.
        website -> Nullable<Varchar>,
        /// Free-text description.
        description -> Nullable<Text>,
        /// Logo image URL.
        logo -> Nullable<Varchar>,
        /// Derived mean of approved review ratings.
        rating -> Double,
        /// Derived count of approved reviews.
        review_count -> Int8,
        /// Owning user.
        owner_id -> Uuid,
        /// Listing creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews; unique per `(company_id, user_id)`.
    reviews (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Reviewed company; rows cascade away with it.
        company_id -> Uuid,
        /// Authoring user.
        user_id -> Uuid,
        /// Star rating, 1 to 5.
        rating -> Int4,
        /// Free-text body.
        text -> Nullable<Text>,
        /// Photo URLs as a JSON array string.
        photos -> Text,
        /// Moderation status.
        status -> Varchar,
        /// Submission timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Forum articles.
    articles (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Headline.
        title -> Varchar,
        /// Full body.
        content -> Text,
        /// Listing excerpt.
        excerpt -> Text,
        /// Cover image URL.
        cover_image -> Nullable<Varchar>,
        /// Tags as a JSON array string.
        tags -> Text,
        /// Moderation status.
        status -> Varchar,
        /// Authoring user; null for anonymous articles.
        author_id -> Nullable<Uuid>,
        /// Display name for anonymous articles.
        anonymous_author -> Nullable<Varchar>,
        /// View counter.
        views -> Int8,
        /// Publication timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Article comments; rows cascade away with their article.
    comments (id) {
        /// Primary key (UUID v4).
        id -> Uuid,
        /// Commented article.
        article_id -> Uuid,
        /// Authoring user; null for anonymous comments.
        user_id -> Nullable<Uuid>,
        /// Display name for anonymous comments.
        anonymous_name -> Nullable<Varchar>,
        /// Comment body.
        text -> Text,
        /// Moderation status.
        status -> Varchar,
        /// Submission timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(companies -> users (owner_id));
diesel::joinable!(reviews -> companies (company_id));
diesel::joinable!(reviews -> users (user_id));
diesel::joinable!(articles -> users (author_id));
diesel::joinable!(comments -> articles (article_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, companies, reviews, articles, comments);
