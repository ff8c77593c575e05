//! Review models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{Collection, Record};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
pub const DEFAULT_RATING: i32 = 5;

/// A user review of a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub title: Option<String>,
    pub content: String,
    pub status: Option<String>,
    #[serde(default)]
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Review {
    const COLLECTION: Collection = Collection::Reviews;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Clamp a submitted rating into 1..=5
pub fn clamp_rating(rating: i32) -> i32 {
    rating.clamp(MIN_RATING, MAX_RATING)
}

/// Review form input
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewReview {
    pub rating: Option<i32>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

impl NewReview {
    pub fn effective_rating(&self) -> i32 {
        clamp_rating(self.rating.unwrap_or(DEFAULT_RATING))
    }
}

/// Insert payload for a review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub shop_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
}

/// Average rating over a set of reviews
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: usize,
}

impl RatingSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let count = reviews.len();
        let average = if count == 0 {
            None
        } else {
            let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
            Some(total as f64 / count as f64)
        };
        Self { average, count }
    }
}
