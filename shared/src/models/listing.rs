//! Shop listing models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{Collection, Record};
use crate::types::{GeoPoint, ListingStatus, OpeningHours, PriceLevel};

/// An ice cream shop in the directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub website_url: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub twitter_url: Option<String>,
    pub description: Option<String>,
    pub pricing: Option<PriceLevel>,
    #[serde(default)]
    pub status: ListingStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hours: Option<OpeningHours>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_profile_id: Option<Uuid>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Listing {
    const COLLECTION: Collection = Collection::Shops;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Listing {
    /// Coordinates usable for a map marker
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }

    /// Detail page route for this listing
    pub fn detail_path(&self) -> String {
        format!("/shop/{}", self.id)
    }
}

/// Insert payload for a listing; absent fields take store defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListingDraft {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 300))]
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PriceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
}

/// Partial update applied by owners, moderators and admins
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 300))]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PriceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<OpeningHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_images: Option<Vec<String>>,
}

/// Status-only update used by the admin status switch
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListingStatusPatch {
    pub status: ListingStatus,
}
