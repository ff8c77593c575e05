//! Dashboard service for admins, users, shop owners and moderators

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Coupon, Event, EventRegistration, Listing, ListingStatus, RatingSummary, Review,
    ReviewWithAuthor, ShopSubmission, SubmissionStatus, UserProfile,
};
use crate::services::review::ReviewService;
use crate::store::{Direction, Gateway, ListQuery};

const RECENT_PER_KIND: usize = 5;
const RECENT_TOTAL: usize = 10;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    gateway: Gateway,
}

/// Admin dashboard metrics
#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub total_listings: u64,
    pub active_listings: u64,
    pub pending_listings: u64,
    pub total_events: u64,
    pub total_coupons: u64,
    pub total_reviews: u64,
    pub total_users: u64,
    pub pending_submissions: u64,
    pub average_rating: Option<f64>,
    pub recent_activity: Vec<Activity>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Listing,
    Review,
}

/// One line of the admin activity feed
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub kind: ActivityKind,
    pub id: Uuid,
    pub summary: String,
    pub at: DateTime<Utc>,
}

/// Signed-in user's dashboard
#[derive(Debug, Serialize)]
pub struct UserDashboard {
    pub profile: UserProfile,
    pub reviews: Vec<Review>,
    pub registrations: Vec<EventRegistration>,
}

/// Owner or moderator view of a single listing
#[derive(Debug, Serialize)]
pub struct ListingDashboard {
    pub listing: Listing,
    pub reviews: Vec<ReviewWithAuthor>,
    pub rating: RatingSummary,
    pub coupons: Vec<Coupon>,
    pub events: Vec<Event>,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn admin_stats(&self) -> AppResult<AdminStats> {
        let all = ListQuery::new();
        let total_listings = self.gateway.count::<Listing>(&all).await?;
        let active_listings = self
            .gateway
            .count::<Listing>(&ListQuery::new().eq("status", ListingStatus::Active))
            .await?;
        let pending_listings = self
            .gateway
            .count::<Listing>(&ListQuery::new().eq("status", ListingStatus::Pending))
            .await?;
        let total_events = self.gateway.count::<Event>(&all).await?;
        let total_coupons = self.gateway.count::<Coupon>(&all).await?;
        let total_users = self.gateway.count::<UserProfile>(&all).await?;
        let pending_submissions = self
            .gateway
            .count::<ShopSubmission>(&ListQuery::new().eq("status", SubmissionStatus::Pending))
            .await?;

        let reviews = self
            .gateway
            .list::<Review>(&ListQuery::new().order_by("created_at", Direction::Desc))
            .await?;
        let rating = RatingSummary::from_reviews(&reviews);

        let recent_listings = self
            .gateway
            .list::<Listing>(
                &ListQuery::new()
                    .order_by("created_at", Direction::Desc)
                    .limit(RECENT_PER_KIND),
            )
            .await?;

        let mut recent_activity: Vec<Activity> = recent_listings
            .into_iter()
            .map(|l| Activity {
                kind: ActivityKind::Listing,
                id: l.id,
                summary: format!("New listing: {}", l.name),
                at: l.created_at,
            })
            .chain(reviews.iter().take(RECENT_PER_KIND).map(|r| Activity {
                kind: ActivityKind::Review,
                id: r.id,
                summary: format!("New {}-star review", r.rating),
                at: r.created_at,
            }))
            .collect();
        recent_activity.sort_by(|a, b| b.at.cmp(&a.at));
        recent_activity.truncate(RECENT_TOTAL);

        Ok(AdminStats {
            total_listings,
            active_listings,
            pending_listings,
            total_events,
            total_coupons,
            total_reviews: rating.count as u64,
            total_users,
            pending_submissions,
            average_rating: rating.average,
            recent_activity,
        })
    }

    pub async fn user_dashboard(&self, profile: UserProfile) -> AppResult<UserDashboard> {
        let reviews = ReviewService::new(self.gateway.clone())
            .for_user(profile.user_id)
            .await?;
        let registrations = self
            .gateway
            .list::<EventRegistration>(
                &ListQuery::new()
                    .eq("user_id", profile.user_id)
                    .order_by("created_at", Direction::Desc),
            )
            .await?;

        Ok(UserDashboard {
            profile,
            reviews,
            registrations,
        })
    }

    /// Listing with its reviews, coupons and events, any status
    pub async fn listing_dashboard(&self, listing_id: Uuid) -> AppResult<ListingDashboard> {
        let listing = self.gateway.fetch::<Listing>(listing_id).await?;
        let reviews = ReviewService::new(self.gateway.clone())
            .for_listing(listing_id)
            .await?;
        let rating = RatingSummary::from_reviews(
            &reviews.iter().map(|r| r.review.clone()).collect::<Vec<_>>(),
        );
        let coupons = self
            .gateway
            .list::<Coupon>(
                &ListQuery::new()
                    .eq("shop_id", listing_id)
                    .order_by("valid_until", Direction::Asc),
            )
            .await?;
        let events = self
            .gateway
            .list::<Event>(
                &ListQuery::new()
                    .eq("shop_id", listing_id)
                    .order_by("event_date", Direction::Asc),
            )
            .await?;

        Ok(ListingDashboard {
            listing,
            reviews,
            rating,
            coupons,
            events,
        })
    }
}
