//! Role and moderator assignment service
//!
//! Role changes and listing assignments are single-field updates with no
//! audit trail. A listing may be assigned to any number of moderators.

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    AssignmentPatch, Listing, OwnProfilePatch, ProfileDraft, ProfilePatch, RolePatch, UserProfile,
    UserRole,
};
use crate::store::{Direction, Gateway, ListQuery};

/// Role service for profiles and moderator assignments
#[derive(Clone)]
pub struct RoleService {
    gateway: Gateway,
}

/// A moderator with the name of their assigned listing
#[derive(Debug, Serialize)]
pub struct ModeratorAssignment {
    #[serde(flatten)]
    pub profile: UserProfile,
    /// Present only when the assigned listing exists and is active
    pub listing_name: Option<String>,
}

impl RoleService {
    /// Create a new RoleService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Profile for an auth subject, if one exists
    pub async fn profile_for_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let query = ListQuery::new().eq("user_id", user_id).limit(1);
        let mut profiles = self.gateway.list::<UserProfile>(&query).await?;
        Ok(profiles.pop())
    }

    /// Create a profile for a newly signed-up user
    pub async fn create_profile(&self, draft: &ProfileDraft) -> AppResult<UserProfile> {
        let profile = self.gateway.create::<UserProfile, _>(draft).await?;
        tracing::info!(profile_id = %profile.id, user_id = %profile.user_id, "profile created");
        Ok(profile)
    }

    pub async fn set_role(&self, profile_id: Uuid, role: UserRole) -> AppResult<UserProfile> {
        let profile = self
            .gateway
            .update::<UserProfile, _>(profile_id, &RolePatch { role })
            .await?;
        tracing::info!(%profile_id, %role, "role updated");
        Ok(profile)
    }

    /// Assign a moderator to a listing, or clear the assignment with `None`.
    /// The listing id is not checked.
    pub async fn assign_listing(
        &self,
        profile_id: Uuid,
        shop_id: Option<Uuid>,
    ) -> AppResult<UserProfile> {
        let profile = self
            .gateway
            .update::<UserProfile, _>(profile_id, &AssignmentPatch { shop_id })
            .await?;
        tracing::info!(%profile_id, ?shop_id, "moderator assignment updated");
        Ok(profile)
    }

    /// Admin user editor
    pub async fn update_profile(
        &self,
        profile_id: Uuid,
        patch: &ProfilePatch,
    ) -> AppResult<UserProfile> {
        patch.validate()?;
        Ok(self.gateway.update::<UserProfile, _>(profile_id, patch).await?)
    }

    /// Self-service edits; role and assignment are out of reach here
    pub async fn update_own_profile(
        &self,
        profile_id: Uuid,
        patch: &OwnProfilePatch,
    ) -> AppResult<UserProfile> {
        patch.validate()?;
        if let Some(name) = &patch.display_name {
            if name.trim().is_empty() {
                return Err(AppError::validation("display_name", "Display name cannot be blank"));
            }
        }
        Ok(self.gateway.update::<UserProfile, _>(profile_id, patch).await?)
    }

    /// Profiles newest first, optionally narrowed by role and free text
    pub async fn list_profiles(
        &self,
        role: Option<UserRole>,
        search: Option<&str>,
    ) -> AppResult<Vec<UserProfile>> {
        let mut query = ListQuery::new().order_by("created_at", Direction::Desc);
        if let Some(role) = role {
            query = query.eq("role", role);
        }
        let profiles = self.gateway.list::<UserProfile>(&query).await?;

        Ok(match search {
            Some(needle) => profiles
                .into_iter()
                .filter(|p| p.matches_search(needle))
                .collect(),
            None => profiles,
        })
    }

    /// Moderators by display name, each with their active assigned listing
    pub async fn list_moderators(&self) -> AppResult<Vec<ModeratorAssignment>> {
        let query = ListQuery::new()
            .eq("role", UserRole::Moderator)
            .order_by("display_name", Direction::Asc);
        let moderators = self.gateway.list::<UserProfile>(&query).await?;

        let assigned: Vec<Uuid> = moderators.iter().filter_map(|m| m.shop_id).collect();
        let listings = if assigned.is_empty() {
            vec![]
        } else {
            let query = ListQuery::new()
                .any_of("id", assigned)
                .eq("status", "active");
            self.gateway.list::<Listing>(&query).await?
        };

        Ok(moderators
            .into_iter()
            .map(|profile| {
                let listing_name = profile
                    .shop_id
                    .and_then(|id| listings.iter().find(|l| l.id == id))
                    .map(|l| l.name.clone());
                ModeratorAssignment {
                    profile,
                    listing_name,
                }
            })
            .collect())
    }
}
