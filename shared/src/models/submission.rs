//! Shop submission models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::ListingDraft;
use crate::schema::{Collection, Record};
use crate::types::ListingStatus;

/// Review state of a submission
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Pending may move to approved or rejected; both are terminal
    pub fn can_transition_to(&self, next: SubmissionStatus) -> bool {
        matches!(
            (self, next),
            (SubmissionStatus::Pending, SubmissionStatus::Approved)
                | (SubmissionStatus::Pending, SubmissionStatus::Rejected)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business proposed for listing by a member of the public
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopSubmission {
    pub id: Uuid,
    pub business_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ShopSubmission {
    const COLLECTION: Collection = Collection::ShopSubmissions;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl ShopSubmission {
    /// Listing created on approval. Status is always pending regardless
    /// of anything the submitter provided.
    pub fn to_listing_draft(&self) -> ListingDraft {
        ListingDraft {
            name: self.business_name.clone(),
            address: self.address.clone(),
            city: Some(self.city.clone()),
            state: Some(self.state.clone()),
            zip_code: self.zip_code.clone(),
            phone: self.contact_phone.clone(),
            website_url: self.website_url.clone(),
            description: self.description.clone(),
            pricing: None,
            status: Some(ListingStatus::Pending),
            owner_name: Some(self.contact_name.clone()),
            owner_email: Some(self.contact_email.clone()),
        }
    }

    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.business_name.to_lowercase().contains(&needle)
            || self.contact_email.to_lowercase().contains(&needle)
    }
}

/// Public "submit a shop" form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewShopSubmission {
    #[validate(length(min = 1, max = 200))]
    pub business_name: String,
    #[validate(length(min = 1, max = 200))]
    pub contact_name: String,
    #[validate(custom = "crate::validation::email_shape")]
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub address: String,
    #[serde(default = "default_city")]
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default = "default_state")]
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_city() -> String {
    "Chicago".to_string()
}

fn default_state() -> String {
    "IL".to_string()
}

/// Status change payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SubmissionStatusPatch {
    pub status: SubmissionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use SubmissionStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_listing_draft_copies_contact_fields() {
        let now = Utc::now();
        let submission = ShopSubmission {
            id: Uuid::new_v4(),
            business_name: "Scoops".to_string(),
            contact_name: "Dana".to_string(),
            contact_email: "dana@example.com".to_string(),
            contact_phone: Some("312-555-0100".to_string()),
            address: "1 Main St".to_string(),
            city: "Chicago".to_string(),
            state: "IL".to_string(),
            zip_code: None,
            website_url: None,
            description: Some("Gelato".to_string()),
            notes: None,
            status: SubmissionStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let draft = submission.to_listing_draft();
        assert_eq!(draft.name, "Scoops");
        assert_eq!(draft.phone.as_deref(), Some("312-555-0100"));
        assert_eq!(draft.owner_name.as_deref(), Some("Dana"));
        assert_eq!(draft.owner_email.as_deref(), Some("dana@example.com"));
        assert_eq!(draft.status, Some(ListingStatus::Pending));
    }
}
