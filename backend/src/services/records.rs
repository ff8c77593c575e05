//! Admin collection management
//!
//! Generic create/update/delete over any collection by slug. Every successful
//! mutation re-reads the whole collection so the admin table reflects the
//! store's current state.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Collection, ContactInquiry, Coupon, Event, EventRegistration, ImportLog, Listing, Page,
    Record, Review, ShopSubmission, UserProfile,
};
use crate::store::{decode, Direction, Gateway, ListQuery, Row};

/// Result of an admin mutation
#[derive(Debug, Serialize)]
pub struct MutationOutcome {
    /// The created or updated record; absent after a delete
    pub record: Option<Value>,
    /// The full collection after the mutation
    pub items: Vec<Value>,
}

/// Records service for admin CRUD
#[derive(Clone)]
pub struct RecordService {
    gateway: Gateway,
}

/// Decode through the collection's model and back, so rows that do not fit
/// the schema are rejected instead of being passed along.
fn normalize_as<T: Record>(row: Row) -> AppResult<Value> {
    let record: T = decode(row)?;
    serde_json::to_value(record).map_err(|e| AppError::Internal(e.to_string()))
}

fn normalize(collection: Collection, row: Row) -> AppResult<Value> {
    match collection {
        Collection::Shops => normalize_as::<Listing>(row),
        Collection::Events => normalize_as::<Event>(row),
        Collection::EventRegistrations => normalize_as::<EventRegistration>(row),
        Collection::Coupons => normalize_as::<Coupon>(row),
        Collection::Reviews => normalize_as::<Review>(row),
        Collection::Profiles => normalize_as::<UserProfile>(row),
        Collection::Pages => normalize_as::<Page>(row),
        Collection::ShopSubmissions => normalize_as::<ShopSubmission>(row),
        Collection::ContactInquiries => normalize_as::<ContactInquiry>(row),
        Collection::ImportLogs => normalize_as::<ImportLog>(row),
    }
}

impl RecordService {
    /// Create a new RecordService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Newest first
    pub async fn list(&self, collection: Collection) -> AppResult<Vec<Value>> {
        let query = ListQuery::new().order_by("created_at", Direction::Desc);
        self.gateway
            .raw()
            .list(collection, &query)
            .await?
            .into_iter()
            .map(|row| normalize(collection, row))
            .collect()
    }

    pub async fn create(&self, collection: Collection, row: Row) -> AppResult<MutationOutcome> {
        let created = self.gateway.raw().insert(collection, row).await?;
        let record = normalize(collection, created)?;
        tracing::info!(%collection, "record created");

        Ok(MutationOutcome {
            record: Some(record),
            items: self.list(collection).await?,
        })
    }

    pub async fn update(&self, collection: Collection, id: Uuid, patch: Row) -> AppResult<MutationOutcome> {
        let updated = self.gateway.raw().update(collection, id, patch).await?;
        let record = normalize(collection, updated)?;
        tracing::info!(%collection, %id, "record updated");

        Ok(MutationOutcome {
            record: Some(record),
            items: self.list(collection).await?,
        })
    }

    pub async fn delete(&self, collection: Collection, id: Uuid) -> AppResult<MutationOutcome> {
        self.gateway.raw().delete(collection, id).await?;
        tracing::info!(%collection, %id, "record deleted");

        Ok(MutationOutcome {
            record: None,
            items: self.list(collection).await?,
        })
    }
}
