//! Record repository gateway
//!
//! One uniform contract for every collection: list with filters and
//! ordering, get by id, insert (single and bulk), update, delete and count.
//! Rows travel as JSON objects keyed by column so a single implementation
//! serves all collections; the typed [`Gateway`] decodes them into domain
//! models, which is where malformed rows are caught.
//!
//! Implementations:
//! - [`PgStore`] talks to the hosted Postgres through sqlx
//! - [`MemoryStore`] keeps rows in process, for tests and demo mode

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use shared::transfer::Row;
use shared::models::{
    ContactInquiry, Coupon, Event, EventRegistration, ImportLog, Listing, Page, Review,
    ShopSubmission, UserProfile,
};
use shared::{Collection, Record};

/// Record store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} {id} not found", .collection.label())]
    NotFound { collection: Collection, id: Uuid },

    #[error("unknown column '{column}' for {collection}")]
    UnknownColumn {
        collection: Collection,
        column: String,
    },

    #[error("missing required column '{column}' for {collection}")]
    MissingColumn {
        collection: Collection,
        column: String,
    },

    #[error("malformed {collection} row: {message}")]
    Malformed {
        collection: Collection,
        message: String,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A single row predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality; a null value matches null columns
    Eq(String, Value),
    Gte(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::Gte(c, _) | Filter::In(c, _) => c,
        }
    }
}

/// Filters, ordering and limit for a list or count call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub order: Vec<(String, Direction)>,
    pub limit: Option<usize>,
}

fn to_json<V: Serialize>(value: V) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<V: Serialize>(mut self, column: &str, value: V) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), to_json(value)));
        self
    }

    pub fn gte<V: Serialize>(mut self, column: &str, value: V) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), to_json(value)));
        self
    }

    pub fn any_of<V: Serialize>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(to_json).collect();
        self.filters.push(Filter::In(column.to_string(), values));
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject columns the collection does not have
    pub fn check(&self, collection: Collection) -> StoreResult<()> {
        let columns = self
            .filters
            .iter()
            .map(Filter::column)
            .chain(self.order.iter().map(|(c, _)| c.as_str()));
        for column in columns {
            if !collection.has_column(column) {
                return Err(StoreError::UnknownColumn {
                    collection,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Validate row keys before a write. Inserts must carry every required
/// column with a non-null value; updates may not null one out.
pub fn check_row(collection: Collection, row: &Row, insert: bool) -> StoreResult<()> {
    if let Some(column) = row.keys().find(|k| !collection.has_column(k)) {
        return Err(StoreError::UnknownColumn {
            collection,
            column: column.clone(),
        });
    }
    let missing = collection.required_columns().iter().find(|c| match row.get(**c) {
        None => insert,
        Some(value) => value.is_null(),
    });
    if let Some(column) = missing {
        return Err(StoreError::MissingColumn {
            collection,
            column: column.to_string(),
        });
    }
    Ok(())
}

/// Check a complete row decodes as its collection's model. Stands in for the
/// column types, enums and NOT NULL constraints of the SQL schema.
pub fn conform(collection: Collection, row: &Row) -> StoreResult<()> {
    fn check<T: Record>(row: &Row) -> StoreResult<()> {
        decode::<T>(row.clone()).map(|_| ())
    }

    match collection {
        Collection::Shops => check::<Listing>(row),
        Collection::Events => check::<Event>(row),
        Collection::EventRegistrations => check::<EventRegistration>(row),
        Collection::Coupons => check::<Coupon>(row),
        Collection::Reviews => check::<Review>(row),
        Collection::Profiles => check::<UserProfile>(row),
        Collection::Pages => check::<Page>(row),
        Collection::ShopSubmissions => check::<ShopSubmission>(row),
        Collection::ContactInquiries => check::<ContactInquiry>(row),
        Collection::ImportLogs => check::<ImportLog>(row),
    }
}

// ============================================================================
// Store Contract
// ============================================================================

/// Storage backend for all collections.
///
/// Each call is one round trip; `insert_many` is all-or-nothing. There is no
/// optimistic concurrency: the last update wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self, collection: Collection, query: &ListQuery) -> StoreResult<Vec<Row>>;

    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Row>>;

    async fn insert(&self, collection: Collection, row: Row) -> StoreResult<Row>;

    async fn insert_many(&self, collection: Collection, rows: Vec<Row>) -> StoreResult<Vec<Row>>;

    /// Fails with `NotFound` when no row has `id`
    async fn update(&self, collection: Collection, id: Uuid, patch: Row) -> StoreResult<Row>;

    /// Fails with `NotFound` when nothing was deleted
    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()>;

    async fn count(&self, collection: Collection, query: &ListQuery) -> StoreResult<u64>;

    /// Reachability check used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}

// ============================================================================
// Typed Gateway
// ============================================================================

/// Serialize a payload into a row; it must serialize to a JSON object
pub fn to_row<P: Serialize>(collection: Collection, payload: &P) -> StoreResult<Row> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Malformed {
            collection,
            message: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(StoreError::Malformed {
            collection,
            message: e.to_string(),
        }),
    }
}

/// Decode a row into its model
pub fn decode<T: Record>(row: Row) -> StoreResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Malformed {
        collection: T::COLLECTION,
        message: e.to_string(),
    })
}

/// Typed access to the record store, shared by every service
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn RecordStore>,
}

impl Gateway {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Untyped store handle for collection-generic callers
    pub fn raw(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub async fn list<T: Record>(&self, query: &ListQuery) -> StoreResult<Vec<T>> {
        tracing::debug!(collection = %T::COLLECTION, ?query, "list");
        self.store
            .list(T::COLLECTION, query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn get<T: Record>(&self, id: Uuid) -> StoreResult<Option<T>> {
        self.store.get(T::COLLECTION, id).await?.map(decode).transpose()
    }

    /// Like `get`, but a missing row is `NotFound`
    pub async fn fetch<T: Record>(&self, id: Uuid) -> StoreResult<T> {
        self.get::<T>(id).await?.ok_or(StoreError::NotFound {
            collection: T::COLLECTION,
            id,
        })
    }

    pub async fn create<T: Record, P: Serialize + Sync>(&self, payload: &P) -> StoreResult<T> {
        let row = to_row(T::COLLECTION, payload)?;
        decode(self.store.insert(T::COLLECTION, row).await?)
    }

    pub async fn create_many<T: Record>(&self, rows: Vec<Row>) -> StoreResult<Vec<T>> {
        self.store
            .insert_many(T::COLLECTION, rows)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn update<T: Record, P: Serialize + Sync>(&self, id: Uuid, patch: &P) -> StoreResult<T> {
        let row = to_row(T::COLLECTION, patch)?;
        decode(self.store.update(T::COLLECTION, id, row).await?)
    }

    pub async fn delete<T: Record>(&self, id: Uuid) -> StoreResult<()> {
        self.store.delete(T::COLLECTION, id).await
    }

    pub async fn count<T: Record>(&self, query: &ListQuery) -> StoreResult<u64> {
        self.store.count(T::COLLECTION, query).await
    }
}
