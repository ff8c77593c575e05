//! Public listing handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::listing_view::ListingQuery;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Listing, NewReview, Review, ReviewWithAuthor};
use crate::services::listing::{ListingDetail, MapView};
use crate::services::{ListingService, ReviewService};
use crate::AppState;

const FEATURED_LIMIT: usize = 6;

/// Response for list of listings
#[derive(Serialize)]
pub struct ListingsResponse {
    pub listings: Vec<Listing>,
    pub total: usize,
}

/// Response for list of reviews
#[derive(Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewWithAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    pub selected: Option<Uuid>,
}

/// Active listings filtered by search text and price, sorted
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingsResponse>, AppError> {
    let service = ListingService::new(state.gateway.clone());
    let listings = service.list_public(&query).await?;

    Ok(Json(ListingsResponse {
        total: listings.len(),
        listings,
    }))
}

/// Featured listings for the home page
pub async fn list_featured_listings(
    State(state): State<AppState>,
) -> Result<Json<ListingsResponse>, AppError> {
    let service = ListingService::new(state.gateway.clone());
    let listings = service.featured(FEATURED_LIMIT).await?;

    Ok(Json(ListingsResponse {
        total: listings.len(),
        listings,
    }))
}

/// Map markers for active listings
pub async fn get_listing_map(
    State(state): State<AppState>,
    Query(query): Query<MapQuery>,
) -> Result<Json<MapView>, AppError> {
    let service = ListingService::new(state.gateway.clone());
    Ok(Json(service.markers(query.selected).await?))
}

/// Listing detail page
pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ListingDetail>, AppError> {
    let service = ListingService::new(state.gateway.clone());
    Ok(Json(service.detail(listing_id).await?))
}

/// Reviews for an active listing
pub async fn list_listing_reviews(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let listing = ListingService::new(state.gateway.clone())
        .get_public(listing_id)
        .await?;
    let reviews = ReviewService::new(state.gateway.clone())
        .for_listing(listing.id)
        .await?;

    Ok(Json(ReviewsResponse { reviews }))
}

/// Post a review as the signed-in user
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<Uuid>,
    Json(input): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let service = ReviewService::new(state.gateway.clone());
    let review = service.create(listing_id, user.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(review)))
}
