//! Contact form inquiries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{Collection, Record};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactInquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for ContactInquiry {
    const COLLECTION: Collection = Collection::ContactInquiries;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewContactInquiry {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(custom = "crate::validation::email_shape")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 300))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}
