//! Bearer-token identity resolution.
//!
//! [`AuthContext`] is an extractor every handler can take: it attempts to
//! verify the `Authorization: Bearer` token and carries the result. A
//! missing, malformed, or expired token resolves to "no identity", which is
//! a normal branch rather than a request failure; that is what keeps the
//! comment-without-login flows working. Endpoints that require a login call
//! [`AuthContext::require_user_id`] and get a 401 on that branch instead.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use chrono::{Duration, Utc};
use futures_util::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Author, Error, User};

use super::state::HttpState;

/// Hours an issued access token stays valid.
const TOKEN_VALIDITY_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    /// Build a codec from the shared signing secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue an access token bound to `user_id`.
    pub fn issue(&self, user_id: Uuid) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_VALIDITY_HOURS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("token issuance failed: {err}")))
    }

    /// Verify a token, yielding the bound user id.
    ///
    /// Any failure (bad signature, expiry, malformed subject) is `None`;
    /// the caller decides whether that matters.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default()).ok()?;
        Uuid::parse_str(&data.claims.sub).ok()
    }
}

/// Strip the bearer token out of the `Authorization` header, if present.
fn bearer_token(request: &HttpRequest) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Resolved identity of the caller, or the anonymous branch.
#[derive(Debug, Clone)]
pub struct AuthContext {
    user_id: Option<Uuid>,
}

impl AuthContext {
    /// Context with a verified identity (test seam).
    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Context with no identity (test seam).
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Verified user id, when the request carried a valid token.
    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Require a verified identity or fail with 401.
    pub fn require_user_id(&self) -> Result<Uuid, Error> {
        self.user_id
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Resolve content authorship per the precedence rule: a verified
    /// identity wins and any payload name is ignored; otherwise the payload
    /// name (or `default`) becomes an anonymous attribution.
    pub fn resolve_author(&self, payload_name: Option<&str>, default: &str) -> Author {
        Author::resolve(self.user_id, payload_name, default)
    }
}

impl FromRequest for AuthContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req
            .app_data::<web::Data<HttpState>>()
            .and_then(|state| bearer_token(req).and_then(|token| state.tokens.verify(token)));
        ready(Ok(Self { user_id }))
    }
}

/// Load the caller's account, failing with 401 when the identity is missing
/// or no longer backed by a row.
pub async fn current_user(state: &HttpState, auth: &AuthContext) -> Result<User, Error> {
    let user_id = auth.require_user_id()?;
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| Error::unauthorized("unknown user"))
}

/// Admin gate shared by every moderation operation.
pub async fn require_admin(state: &HttpState, auth: &AuthContext) -> Result<User, Error> {
    let user = current_user(state, auth).await?;
    if !user.is_admin() {
        return Err(Error::forbidden("admin role required"));
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ANONYMOUS_USER;
    use rstest::rstest;

    #[rstest]
    fn issued_tokens_verify() {
        let codec = TokenCodec::new("test secret");
        let user_id = Uuid::new_v4();
        let token = codec.issue(user_id).expect("token issued");
        assert_eq!(codec.verify(&token), Some(user_id));
    }

    #[rstest]
    fn foreign_and_garbled_tokens_do_not_verify() {
        let codec = TokenCodec::new("test secret");
        let other = TokenCodec::new("different secret");
        let token = other.issue(Uuid::new_v4()).expect("token issued");
        assert_eq!(codec.verify(&token), None);
        assert_eq!(codec.verify("not-a-token"), None);
    }

    #[rstest]
    fn require_user_id_maps_to_401() {
        let error = AuthContext::anonymous()
            .require_user_id()
            .expect_err("no identity");
        assert_eq!(error.code, crate::domain::ErrorCode::Unauthorized);
    }

    #[rstest]
    fn resolve_author_ignores_payload_for_authenticated_callers() {
        let id = Uuid::new_v4();
        let author =
            AuthContext::authenticated(id).resolve_author(Some("Impostor"), ANONYMOUS_USER);
        assert_eq!(author, Author::Authenticated(id));
    }

    #[rstest]
    fn resolve_author_uses_payload_for_anonymous_callers() {
        let author = AuthContext::anonymous().resolve_author(Some("Casey"), ANONYMOUS_USER);
        assert_eq!(author, Author::Anonymous("Casey".to_owned()));
    }
}
