//! Listing service
//!
//! Public reads only ever see active listings. Owners, moderators and
//! admins edit through the same patch path.

use serde::Serialize;
use shared::listing_view::{self, ListingQuery, MapMarker, MapViewport};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    Listing, ListingPatch, ListingStatus, ListingStatusPatch, RatingSummary, ReviewWithAuthor,
};
use crate::services::review::ReviewService;
use crate::store::{Direction, Gateway, ListQuery};

/// Listing service
#[derive(Clone)]
pub struct ListingService {
    gateway: Gateway,
}

/// Public detail page payload
#[derive(Debug, Serialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub reviews: Vec<ReviewWithAuthor>,
    pub rating: RatingSummary,
}

/// Map page payload
#[derive(Debug, Serialize)]
pub struct MapView {
    pub viewport: MapViewport,
    pub markers: Vec<MapMarker>,
}

impl ListingService {
    /// Create a new ListingService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    async fn active(&self) -> AppResult<Vec<Listing>> {
        let query = ListQuery::new()
            .eq("status", ListingStatus::Active)
            .order_by("name", Direction::Asc);
        Ok(self.gateway.list::<Listing>(&query).await?)
    }

    /// Active listings, filtered and sorted
    pub async fn list_public(&self, query: &ListingQuery) -> AppResult<Vec<Listing>> {
        let source = self.active().await?;
        Ok(listing_view::filter_and_sort(&source, query))
    }

    /// Active featured listings for the home page
    pub async fn featured(&self, limit: usize) -> AppResult<Vec<Listing>> {
        let query = ListQuery::new()
            .eq("status", ListingStatus::Active)
            .eq("featured", true)
            .order_by("name", Direction::Asc)
            .limit(limit);
        Ok(self.gateway.list::<Listing>(&query).await?)
    }

    /// Active listing by id; anything else reads as not found
    pub async fn get_public(&self, id: Uuid) -> AppResult<Listing> {
        match self.gateway.get::<Listing>(id).await? {
            Some(listing) if listing.status.is_public() => Ok(listing),
            _ => Err(AppError::NotFound("Listing".to_string())),
        }
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<ListingDetail> {
        let listing = self.get_public(id).await?;
        let reviews = ReviewService::new(self.gateway.clone())
            .for_listing(listing.id)
            .await?;
        let rating = RatingSummary::from_reviews(
            &reviews.iter().map(|r| r.review.clone()).collect::<Vec<_>>(),
        );

        Ok(ListingDetail {
            listing,
            reviews,
            rating,
        })
    }

    pub async fn markers(&self, selected: Option<Uuid>) -> AppResult<MapView> {
        let listings = self.active().await?;
        Ok(MapView {
            viewport: MapViewport::default(),
            markers: listing_view::map_markers(&listings, selected),
        })
    }

    /// Any listing regardless of status, for staff views
    pub async fn get(&self, id: Uuid) -> AppResult<Listing> {
        Ok(self.gateway.fetch::<Listing>(id).await?)
    }

    /// Listing claimed by a shop owner's profile
    pub async fn owned_by(&self, profile_id: Uuid) -> AppResult<Option<Listing>> {
        let query = ListQuery::new()
            .eq("owner_profile_id", profile_id)
            .order_by("created_at", Direction::Asc)
            .limit(1);
        Ok(self.gateway.list::<Listing>(&query).await?.pop())
    }

    pub async fn update_listing(&self, id: Uuid, patch: &ListingPatch) -> AppResult<Listing> {
        patch.validate()?;
        let listing = self.gateway.update::<Listing, _>(id, patch).await?;
        tracing::info!(listing_id = %id, "listing updated");
        Ok(listing)
    }

    pub async fn set_status(&self, id: Uuid, status: ListingStatus) -> AppResult<Listing> {
        let listing = self
            .gateway
            .update::<Listing, _>(id, &ListingStatusPatch { status })
            .await?;
        tracing::info!(listing_id = %id, %status, "listing status changed");
        Ok(listing)
    }
}
