//! Domain models for the ice cream directory
//!
//! Re-exports models from the shared crate and adds backend-specific views

pub use shared::models::*;
pub use shared::schema::{Collection, Record};
pub use shared::types::*;

use serde::Serialize;

/// A review with its author's display name
#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: Review,
    pub author_name: Option<String>,
}

/// Minimal listing reference embedded in other views
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListingSummary {
    pub id: uuid::Uuid,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub detail_path: String,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            name: listing.name.clone(),
            address: listing.address.clone(),
            city: listing.city.clone(),
            detail_path: listing.detail_path(),
        }
    }
}
