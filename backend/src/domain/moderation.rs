//! Moderation state machine shared by companies, reviews, articles, and comments.
//!
//! Every moderatable row carries exactly one [`ModerationStatus`]; only the
//! current status persists (no transition history). Admin-gated transition
//! handlers parse the target state through this closed enum, so invalid
//! status strings never reach storage.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::Error;

/// Lifecycle state of a moderatable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    /// Submitted, awaiting an admin decision; hidden from public listings.
    Pending,
    /// Visible in public listings and detail views.
    Approved,
    /// Hidden from public listings; kept for the owner and moderators.
    Rejected,
}

impl ModerationStatus {
    /// Parse a caller-supplied status, rejecting anything outside the closed
    /// set with a validation error.
    pub fn parse(value: &str) -> Result<Self, Error> {
        value.parse().map_err(|()| {
            Error::invalid_request("status must be one of pending, approved, rejected")
        })
    }

    /// Stable lowercase name, matching the wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ModerationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initial-status policy for newly created content.
///
/// Companies always enter the queue as [`ModerationStatus::Pending`]. Reviews,
/// articles, and comments auto-approve by default; flipping
/// `require_content_review` holds them at pending instead. This is a
/// configuration choice, not a structural one: the state machine is identical
/// either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPolicy {
    /// Hold new reviews, articles, and comments for admin review.
    pub require_content_review: bool,
}

impl ContentPolicy {
    /// Initial status for a newly listed company.
    pub fn initial_company_status(&self) -> ModerationStatus {
        ModerationStatus::Pending
    }

    /// Initial status for newly submitted reviews, articles, and comments.
    pub fn initial_content_status(&self) -> ModerationStatus {
        if self.require_content_review {
            ModerationStatus::Pending
        } else {
            ModerationStatus::Approved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pending", ModerationStatus::Pending)]
    #[case("approved", ModerationStatus::Approved)]
    #[case("rejected", ModerationStatus::Rejected)]
    fn parse_accepts_the_closed_set(#[case] raw: &str, #[case] expected: ModerationStatus) {
        assert_eq!(ModerationStatus::parse(raw).expect("valid status"), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    #[case("deleted")]
    #[case("Approved")]
    #[case("")]
    fn parse_rejects_anything_else(#[case] raw: &str) {
        let error = ModerationStatus::parse(raw).expect_err("invalid status");
        assert_eq!(error.code, crate::domain::ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn serde_round_trips_lowercase() {
        let json = serde_json::to_string(&ModerationStatus::Rejected).expect("serialises");
        assert_eq!(json, "\"rejected\"");
        let back: ModerationStatus = serde_json::from_str(&json).expect("deserialises");
        assert_eq!(back, ModerationStatus::Rejected);
    }

    #[rstest]
    fn companies_always_start_pending() {
        let policy = ContentPolicy {
            require_content_review: true,
        };
        assert_eq!(
            policy.initial_company_status(),
            ModerationStatus::Pending
        );
        assert_eq!(
            ContentPolicy::default().initial_company_status(),
            ModerationStatus::Pending
        );
    }

    #[rstest]
    #[case(false, ModerationStatus::Approved)]
    #[case(true, ModerationStatus::Pending)]
    fn content_status_follows_policy(#[case] review: bool, #[case] expected: ModerationStatus) {
        let policy = ContentPolicy {
            require_content_review: review,
        };
        assert_eq!(policy.initial_content_status(), expected);
    }
}
