//! Identity endpoints.
//!
//! ```text
//! POST /api/auth/register  {"email":..,"password":..,"name":..}
//! POST /api/auth/login     {"email":..,"password":..}
//! GET  /api/auth/profile
//! PUT  /api/auth/profile   {"name":..,"avatar":..}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::auth::{hash_password, verify_password};
use crate::domain::{ApiResult, Error, NewUser, ProfileUpdate, UserProfile, UserRole};

use super::auth::{AuthContext, current_user};
use super::state::HttpState;

/// Registration request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Login email; must be unused.
    pub email: Option<String>,
    /// Plaintext password, hashed before storage.
    pub password: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
}

/// Token-bearing response returned by register and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// The authenticated account.
    pub user: UserProfile,
}

/// Profile update request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileRequest {
    /// New display name.
    pub name: Option<String>,
    /// New avatar URL.
    pub avatar: Option<String>,
}

fn required(value: Option<String>, message: &'static str) -> Result<String, Error> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::invalid_request(message))
}

/// Register a new account and issue its first access token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"]
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let missing = "Email, password and name are required";
    let email = required(payload.email, missing)?;
    let password = required(payload.password, missing)?;
    let name = required(payload.name, missing)?;

    let user = state
        .users
        .create(NewUser {
            email,
            password_hash: hash_password(&password)?,
            name,
            role: UserRole::User,
        })
        .await?;
    let access_token = state.tokens.issue(user.id)?;
    tracing::info!(user_id = %user.id, "account registered");

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User created successfully".to_owned(),
        access_token,
        user: user.profile(),
    }))
}

/// Authenticate and issue an access token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Missing fields", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"]
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let missing = "Email and password are required";
    let email = required(payload.email, missing)?;
    let password = required(payload.password, missing)?;

    let user = state.users.find_by_email(&email).await?;
    let Some(user) = user.filter(|user| verify_password(&user.password_hash, &password)) else {
        return Err(Error::unauthorized("Invalid credentials"));
    };
    let access_token = state.tokens.issue(user.id)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_owned(),
        access_token,
        user: user.profile(),
    }))
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["auth"]
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<UserProfile>> {
    let user = current_user(&state, &auth).await?;
    Ok(web::Json(user.profile()))
}

/// Update the caller's display name or avatar.
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["auth"]
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = auth.require_user_id()?;
    let payload = payload.into_inner();
    let user = state
        .users
        .update_profile(
            user_id,
            ProfileUpdate {
                name: payload.name,
                avatar: payload.avatar,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Profile updated successfully",
        "user": user.profile(),
    })))
}

/// Mount the identity endpoints.
pub fn scope() -> actix_web::Scope {
    web::scope("/auth")
        .service(register)
        .service(login)
        .service(get_profile)
        .service(update_profile)
}
