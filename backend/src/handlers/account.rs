//! Signed-in user, shop owner and moderator handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{AuthUser, CurrentUser};
use crate::models::{Listing, ListingPatch, OwnProfilePatch, UserProfile, UserRole};
use crate::services::dashboard::{ListingDashboard, UserDashboard};
use crate::services::{DashboardService, ListingService, ReviewService, RoleService};
use crate::AppState;

async fn own_profile(state: &AppState, user: &AuthUser) -> Result<UserProfile, AppError> {
    RoleService::new(state.gateway.clone())
        .profile_for_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("No profile for this account".to_string()))
}

/// Profile, reviews and event registrations of the signed-in user
pub async fn get_my_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserDashboard>, AppError> {
    let profile = own_profile(&state, &user).await?;
    let service = DashboardService::new(state.gateway.clone());
    Ok(Json(service.user_dashboard(profile).await?))
}

pub async fn update_my_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(patch): Json<OwnProfilePatch>,
) -> Result<Json<UserProfile>, AppError> {
    let service = RoleService::new(state.gateway.clone());
    Ok(Json(service.update_own_profile(user.profile_id, &patch).await?))
}

pub async fn delete_my_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ReviewService::new(state.gateway.clone())
        .delete_own(review_id, user.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Shop Owner
// ============================================================================

async fn owned_listing_id(state: &AppState, user: &AuthUser) -> Result<Uuid, AppError> {
    ListingService::new(state.gateway.clone())
        .owned_by(user.profile_id)
        .await?
        .map(|listing| listing.id)
        .ok_or_else(|| AppError::NotFound("Listing".to_string()))
}

/// Dashboard for the listing the user owns
pub async fn get_my_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ListingDashboard>, AppError> {
    let listing_id = owned_listing_id(&state, &user).await?;
    let service = DashboardService::new(state.gateway.clone());
    Ok(Json(service.listing_dashboard(listing_id).await?))
}

pub async fn update_my_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(patch): Json<ListingPatch>,
) -> Result<Json<Listing>, AppError> {
    let listing_id = owned_listing_id(&state, &user).await?;
    let service = ListingService::new(state.gateway.clone());
    Ok(Json(service.update_listing(listing_id, &patch).await?))
}

// ============================================================================
// Moderator
// ============================================================================

/// Listing assigned to the moderator; admins pass the role check but still
/// need an assignment
fn assigned_listing_id(user: &AuthUser) -> Result<Uuid, AppError> {
    user.require(UserRole::Moderator)?;
    user.shop_id
        .ok_or_else(|| AppError::NotFound("Listing".to_string()))
}

pub async fn get_assigned_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ListingDashboard>, AppError> {
    let listing_id = assigned_listing_id(&user)?;
    let service = DashboardService::new(state.gateway.clone());
    Ok(Json(service.listing_dashboard(listing_id).await?))
}

pub async fn update_assigned_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(patch): Json<ListingPatch>,
) -> Result<Json<Listing>, AppError> {
    let listing_id = assigned_listing_id(&user)?;
    let service = ListingService::new(state.gateway.clone());
    Ok(Json(service.update_listing(listing_id, &patch).await?))
}

pub async fn delete_assigned_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let listing_id = assigned_listing_id(&user)?;
    ReviewService::new(state.gateway.clone())
        .delete_for_listing(review_id, listing_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
