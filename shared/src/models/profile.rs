//! User profile and role models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{Collection, Record};

/// Platform roles, ordered from least to most privileged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Moderator,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Moderator => "moderator",
            UserRole::Admin => "admin",
        }
    }

    /// Whether this role grants at least the access of `required`
    pub fn satisfies(&self, required: UserRole) -> bool {
        *self >= required
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "moderator" => Ok(UserRole::Moderator),
            "admin" => Ok(UserRole::Admin),
            _ => Err("role must be one of user, moderator, admin"),
        }
    }
}

/// Per-user profile, keyed by the auth provider's user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    /// Listing a moderator is assigned to
    pub shop_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for UserProfile {
    const COLLECTION: Collection = Collection::Profiles;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl UserProfile {
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.display_name, &self.bio]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Insert payload for a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// Role change payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RolePatch {
    pub role: UserRole,
}

/// Moderator assignment payload; `None` clears the assignment
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssignmentPatch {
    pub shop_id: Option<Uuid>,
}

/// Admin user editor payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// Self-service profile edits
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OwnProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(UserRole::Admin.satisfies(UserRole::Moderator));
        assert!(UserRole::Moderator.satisfies(UserRole::User));
        assert!(!UserRole::User.satisfies(UserRole::Moderator));
    }

    #[test]
    fn test_assignment_patch_serializes_null() {
        let json = serde_json::to_value(AssignmentPatch { shop_id: None }).unwrap();
        assert_eq!(json, serde_json::json!({ "shop_id": null }));
    }
}
