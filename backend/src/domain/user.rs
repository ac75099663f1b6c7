//! Registered users and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Authorization level of a registered user.
///
/// `Admin` is the single elevated level; it alone may perform moderation
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Ordinary registered user.
    User,
    /// Moderator with status-transition rights on every entity.
    Admin,
}

impl UserRole {
    /// Stable lowercase name, matching the wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// A registered account.
///
/// The password hash never leaves the domain: wire payloads are built from
/// [`User::profile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: Uuid,
    /// Unique login email.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Display name shown next to authored content.
    pub name: String,
    /// Authorization level.
    pub role: UserRole,
    /// Avatar URL, if the user uploaded one.
    pub avatar: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user may perform moderation transitions.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Wire-safe projection of the account.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            avatar: self.avatar.clone(),
            created_at: self.created_at,
        }
    }

    /// Short projection embedded in company payloads.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Account projection returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserProfile {
    /// Stable identifier.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Authorization level.
    pub role: UserRole,
    /// Avatar URL, if set.
    pub avatar: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Minimal user projection for embedding in other payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserSummary {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// Creation payload for an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login email.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Authorization level.
    pub role: UserRole,
}

/// Partial profile update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New avatar URL.
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fixture_user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "casey@example.net".to_owned(),
            password_hash: "$argon2id$fixture".to_owned(),
            name: "Casey".to_owned(),
            role,
            avatar: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(UserRole::User, false)]
    #[case(UserRole::Admin, true)]
    fn only_admins_moderate(#[case] role: UserRole, #[case] expected: bool) {
        assert_eq!(fixture_user(role).is_admin(), expected);
    }

    #[rstest]
    fn profile_omits_the_password_hash() {
        let user = fixture_user(UserRole::User);
        let value = serde_json::to_value(user.profile()).expect("serialises");
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "casey@example.net");
        assert_eq!(value["role"], "user");
    }

    #[rstest]
    #[case("user", UserRole::User)]
    #[case("admin", UserRole::Admin)]
    fn role_parses_storage_values(#[case] raw: &str, #[case] expected: UserRole) {
        assert_eq!(raw.parse::<UserRole>().expect("known role"), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        assert!("owner".parse::<UserRole>().is_err());
    }
}
