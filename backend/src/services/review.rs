//! Review service

use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Listing, NewReview, Review, ReviewDraft, ReviewWithAuthor, UserProfile};
use crate::store::{Direction, Gateway, ListQuery};

/// Review service
#[derive(Clone)]
pub struct ReviewService {
    gateway: Gateway,
}

impl ReviewService {
    /// Create a new ReviewService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Post a review on an active listing. Ratings outside 1..=5 are clamped.
    pub async fn create(&self, listing_id: Uuid, user_id: Uuid, input: NewReview) -> AppResult<Review> {
        input.validate()?;
        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::validation("content", "Review text is required"));
        }

        match self.gateway.get::<Listing>(listing_id).await? {
            Some(listing) if listing.status.is_public() => {}
            _ => return Err(AppError::NotFound("Listing".to_string())),
        }

        let draft = ReviewDraft {
            shop_id: listing_id,
            user_id,
            rating: input.effective_rating(),
            title: input
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            content: content.to_string(),
        };
        let review = self.gateway.create::<Review, _>(&draft).await?;
        tracing::info!(review_id = %review.id, %listing_id, rating = review.rating, "review created");
        Ok(review)
    }

    /// Reviews for a listing, newest first, with author display names
    pub async fn for_listing(&self, listing_id: Uuid) -> AppResult<Vec<ReviewWithAuthor>> {
        let query = ListQuery::new()
            .eq("shop_id", listing_id)
            .order_by("created_at", Direction::Desc);
        let reviews = self.gateway.list::<Review>(&query).await?;
        if reviews.is_empty() {
            return Ok(vec![]);
        }

        let mut authors: Vec<Uuid> = reviews.iter().map(|r| r.user_id).collect();
        authors.sort();
        authors.dedup();
        let profiles = self
            .gateway
            .list::<UserProfile>(&ListQuery::new().any_of("user_id", authors))
            .await?;

        Ok(reviews
            .into_iter()
            .map(|review| {
                let author_name = profiles
                    .iter()
                    .find(|p| p.user_id == review.user_id)
                    .and_then(|p| p.display_name.clone());
                ReviewWithAuthor {
                    review,
                    author_name,
                }
            })
            .collect())
    }

    /// Reviews written by one user, newest first
    pub async fn for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let query = ListQuery::new()
            .eq("user_id", user_id)
            .order_by("created_at", Direction::Desc);
        Ok(self.gateway.list::<Review>(&query).await?)
    }

    /// Delete a review written by `user_id`
    pub async fn delete_own(&self, review_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let review = self.gateway.fetch::<Review>(review_id).await?;
        if review.user_id != user_id {
            return Err(AppError::InsufficientPermissions);
        }
        self.gateway.delete::<Review>(review_id).await?;
        tracing::info!(%review_id, "review deleted by author");
        Ok(())
    }

    /// Delete a review on the listing a moderator looks after
    pub async fn delete_for_listing(&self, review_id: Uuid, listing_id: Uuid) -> AppResult<()> {
        let review = self.gateway.fetch::<Review>(review_id).await?;
        if review.shop_id != listing_id {
            return Err(AppError::InsufficientPermissions);
        }
        self.gateway.delete::<Review>(review_id).await?;
        tracing::info!(%review_id, %listing_id, "review removed by moderator");
        Ok(())
    }
}
