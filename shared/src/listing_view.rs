//! Public listing view: text/price filtering, sorting and map markers
//!
//! Everything here is pure and recomputed from the full source slice on each
//! call. Directory sizes are small enough that indexing is not worth it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Listing;
use crate::types::{GeoPoint, PriceLevel};

/// Sort order for the listing grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Name,
    PriceLow,
    PriceHigh,
}

/// Filter and sort parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub price: Option<PriceLevel>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Case-insensitive substring match over name, city, state, address,
/// description and the space-joined amenities.
pub fn matches_text(listing: &Listing, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let amenities = listing.amenities.join(" ");
    let fields = [
        Some(listing.name.as_str()),
        listing.city.as_deref(),
        listing.state.as_deref(),
        Some(listing.address.as_str()),
        listing.description.as_deref(),
        Some(amenities.as_str()),
    ];

    let matched = fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle));
    matched
}

pub fn matches_price(listing: &Listing, price: Option<PriceLevel>) -> bool {
    match price {
        None => true,
        Some(level) => listing.pricing == Some(level),
    }
}

/// Listings the public may see
pub fn public_listings(source: &[Listing]) -> Vec<Listing> {
    source
        .iter()
        .filter(|l| l.status.is_public())
        .cloned()
        .collect()
}

/// Compare two listings under `order`
pub fn compare(a: &Listing, b: &Listing, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Name => compare_names(a, b),
        SortOrder::PriceLow => PriceLevel::tier_of(a.pricing).cmp(&PriceLevel::tier_of(b.pricing)),
        SortOrder::PriceHigh => PriceLevel::tier_of(b.pricing).cmp(&PriceLevel::tier_of(a.pricing)),
    }
}

fn compare_names(a: &Listing, b: &Listing) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Apply the public-visibility rule, filters and sort (stable)
pub fn filter_and_sort(source: &[Listing], query: &ListingQuery) -> Vec<Listing> {
    let needle = query.search.as_deref().unwrap_or("");
    let mut result: Vec<Listing> = source
        .iter()
        .filter(|l| l.status.is_public())
        .filter(|l| matches_text(l, needle))
        .filter(|l| matches_price(l, query.price))
        .cloned()
        .collect();

    result.sort_by(|a, b| compare(a, b, query.sort));
    result
}

// ============================================================================
// Map Markers
// ============================================================================

/// Initial map viewport
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MapViewport {
    pub center: GeoPoint,
    pub zoom: u8,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(41.8781, -87.6298),
            zoom: 11,
        }
    }
}

/// Marker data for one listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapMarker {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub selected: bool,
    pub detail_path: String,
}

/// Project listings with usable coordinates into markers
pub fn map_markers(listings: &[Listing], selected: Option<Uuid>) -> Vec<MapMarker> {
    listings
        .iter()
        .filter_map(|listing| {
            let point = listing.location()?;
            Some(MapMarker {
                id: listing.id,
                name: listing.name.clone(),
                address: listing.address.clone(),
                latitude: point.latitude,
                longitude: point.longitude,
                selected: selected == Some(listing.id),
                detail_path: listing.detail_path(),
            })
        })
        .collect()
}
