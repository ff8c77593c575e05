//! Profile, role and moderator assignment handlers (admin)

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{AssignmentPatch, ProfilePatch, RolePatch, UserProfile, UserRole};
use crate::services::role::ModeratorAssignment;
use crate::services::RoleService;
use crate::AppState;

/// Response for list of profiles
#[derive(Serialize)]
pub struct ProfilesResponse {
    pub profiles: Vec<UserProfile>,
    pub total: usize,
}

/// Response for list of moderators
#[derive(Serialize)]
pub struct ModeratorsResponse {
    pub moderators: Vec<ModeratorAssignment>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

pub async fn list_profiles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfilesResponse>, AppError> {
    user.require(UserRole::Admin)?;

    let role_service = RoleService::new(state.gateway.clone());
    let profiles = role_service
        .list_profiles(query.role, query.search.as_deref())
        .await?;

    Ok(Json(ProfilesResponse {
        total: profiles.len(),
        profiles,
    }))
}

/// Edit a user's display name, bio and role
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(profile_id): Path<Uuid>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserProfile>, AppError> {
    user.require(UserRole::Admin)?;

    let role_service = RoleService::new(state.gateway.clone());
    Ok(Json(role_service.update_profile(profile_id, &patch).await?))
}

pub async fn set_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(profile_id): Path<Uuid>,
    Json(patch): Json<RolePatch>,
) -> Result<Json<UserProfile>, AppError> {
    user.require(UserRole::Admin)?;

    let role_service = RoleService::new(state.gateway.clone());
    Ok(Json(role_service.set_role(profile_id, patch.role).await?))
}

/// Assign a moderator to a listing; `{"shop_id": null}` clears it
pub async fn assign_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(profile_id): Path<Uuid>,
    Json(patch): Json<AssignmentPatch>,
) -> Result<Json<UserProfile>, AppError> {
    user.require(UserRole::Admin)?;

    let role_service = RoleService::new(state.gateway.clone());
    Ok(Json(role_service.assign_listing(profile_id, patch.shop_id).await?))
}

pub async fn list_moderators(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ModeratorsResponse>, AppError> {
    user.require(UserRole::Admin)?;

    let role_service = RoleService::new(state.gateway.clone());
    let moderators = role_service.list_moderators().await?;

    Ok(Json(ModeratorsResponse { moderators }))
}
