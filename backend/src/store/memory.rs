//! In-process record store
//!
//! Mirrors the SQL schema closely enough for workflows to behave the same:
//! unknown columns and missing required columns are rejected, column
//! defaults are filled in, and `insert_many` is all-or-nothing.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_row, conform, Direction, Filter, ListQuery, RecordStore, Row, StoreError, StoreResult};
use shared::Collection;

/// Record store holding every collection in memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<Collection, Vec<Row>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Column defaults, matching the migration
fn column_defaults(collection: Collection) -> Vec<(&'static str, Value)> {
    match collection {
        Collection::Shops => vec![
            ("status", json!("pending")),
            ("featured", json!(false)),
            ("amenities", json!([])),
            ("gallery_images", json!([])),
        ],
        Collection::Events => vec![("is_featured", json!(false)), ("gallery_images", json!([]))],
        Collection::Coupons => vec![
            ("current_usage", json!(0)),
            ("is_active", json!(true)),
            ("gallery_images", json!([])),
        ],
        Collection::Reviews => vec![("status", json!("published")), ("helpful_count", json!(0))],
        Collection::Profiles => vec![("role", json!("user"))],
        Collection::Pages => vec![("page_type", json!("custom")), ("is_published", json!(false))],
        Collection::ShopSubmissions => vec![("status", json!("pending"))],
        Collection::ContactInquiries => vec![("status", json!("new"))],
        Collection::ImportLogs => vec![
            ("total_records", json!(0)),
            ("successful_records", json!(0)),
            ("failed_records", json!(0)),
            ("errors", json!([])),
        ],
        Collection::EventRegistrations => vec![],
    }
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

/// Complete a row for insertion the way the database would
fn materialize(collection: Collection, mut row: Row) -> Row {
    let now = now_value();
    row.entry("id".to_string())
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at".to_string()).or_insert_with(|| now.clone());
    if collection.has_updated_at() {
        row.entry("updated_at".to_string()).or_insert_with(|| now.clone());
    }
    for (column, default) in column_defaults(collection) {
        row.entry(column.to_string()).or_insert(default);
    }
    for column in collection.data_columns() {
        row.entry(column.to_string()).or_insert(Value::Null);
    }
    row
}

fn row_id(row: &Row) -> Option<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Order two JSON cells. Timestamps compare chronologically whatever their
/// offset notation; null sorts last.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => match (parse_time(x), parse_time(y)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.cmp(y),
        },
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        // Numbers stored as strings (decimals) against numeric filters
        (Value::String(x), Value::Number(y)) | (Value::Number(y), Value::String(x)) => {
            match (x.parse::<f64>(), y.as_f64()) {
                (Ok(xf), Some(yf)) => {
                    let ord = xf.partial_cmp(&yf).unwrap_or(Ordering::Equal);
                    if matches!(a, Value::String(_)) {
                        ord
                    } else {
                        ord.reverse()
                    }
                }
                _ => a.to_string().cmp(&b.to_string()),
            }
        }
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn cell<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, Value::Null) => cell(row, column).is_null(),
        Filter::Eq(column, value) => {
            let current = cell(row, column);
            !current.is_null() && compare_values(current, value) == Ordering::Equal
        }
        Filter::Gte(column, value) => {
            let current = cell(row, column);
            !current.is_null() && compare_values(current, value) != Ordering::Less
        }
        Filter::In(column, values) => {
            let current = cell(row, column);
            !current.is_null()
                && values
                    .iter()
                    .any(|v| compare_values(current, v) == Ordering::Equal)
        }
    }
}

fn select(rows: &[Row], query: &ListQuery) -> Vec<Row> {
    let mut selected: Vec<Row> = rows
        .iter()
        .filter(|row| query.filters.iter().all(|f| matches(row, f)))
        .cloned()
        .collect();

    selected.sort_by(|a, b| {
        query
            .order
            .iter()
            .map(|(column, direction)| {
                let (x, y) = (cell(a, column), cell(b, column));
                match (x.is_null(), y.is_null(), direction) {
                    // nulls last in both directions
                    (false, false, Direction::Desc) => compare_values(y, x),
                    _ => compare_values(x, y),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    if let Some(limit) = query.limit {
        selected.truncate(limit);
    }
    selected
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, collection: Collection, query: &ListQuery) -> StoreResult<Vec<Row>> {
        query.check(collection)?;
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .map(|rows| select(rows, query))
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Row>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&collection)
            .and_then(|rows| rows.iter().find(|r| row_id(r) == Some(id)).cloned()))
    }

    async fn insert(&self, collection: Collection, row: Row) -> StoreResult<Row> {
        check_row(collection, &row, true)?;
        let row = materialize(collection, row);
        conform(collection, &row)?;
        let mut tables = self.tables.write().await;
        tables.entry(collection).or_default().push(row.clone());
        Ok(row)
    }

    async fn insert_many(&self, collection: Collection, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        for row in &rows {
            check_row(collection, row, true)?;
        }
        let rows: Vec<Row> = rows.into_iter().map(|r| materialize(collection, r)).collect();
        for row in &rows {
            conform(collection, row)?;
        }

        let mut tables = self.tables.write().await;
        tables.entry(collection).or_default().extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn update(&self, collection: Collection, id: Uuid, mut patch: Row) -> StoreResult<Row> {
        patch.remove("id");
        patch.remove("created_at");
        patch.remove("updated_at");
        check_row(collection, &patch, false)?;

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id)))
            .ok_or(StoreError::NotFound { collection, id })?;

        let mut candidate = row.clone();
        for (column, value) in patch {
            candidate.insert(column, value);
        }
        if collection.has_updated_at() {
            candidate.insert("updated_at".to_string(), now_value());
        }
        conform(collection, &candidate)?;
        *row = candidate;
        Ok(row.clone())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(collection).or_default();
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));

        if rows.len() == before {
            return Err(StoreError::NotFound { collection, id });
        }
        Ok(())
    }

    async fn count(&self, collection: Collection, query: &ListQuery) -> StoreResult<u64> {
        query.check(collection)?;
        let tables = self.tables.read().await;
        let count = tables
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop(name: &str, status: &str) -> Row {
        let mut row = Row::new();
        row.insert("name".into(), json!(name));
        row.insert("address".into(), json!("1 Main St"));
        row.insert("status".into(), json!(status));
        row
    }

    #[tokio::test]
    async fn test_insert_fills_defaults() {
        let store = MemoryStore::new();
        let mut row = Row::new();
        row.insert("name".into(), json!("Scoops"));
        row.insert("address".into(), json!("1 Main St"));

        let inserted = store.insert(Collection::Shops, row).await.unwrap();
        assert_eq!(inserted["status"], json!("pending"));
        assert_eq!(inserted["amenities"], json!([]));
        assert!(inserted["city"].is_null());
        assert!(row_id(&inserted).is_some());
    }

    #[tokio::test]
    async fn test_unknown_column_rejected() {
        let store = MemoryStore::new();
        let mut row = shop("Scoops", "active");
        row.insert("flavor_of_the_day".into(), json!("mint"));

        let err = store.insert(Collection::Shops, row).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let store = MemoryStore::new();
        let mut bad = Row::new();
        bad.insert("name".into(), json!("No Address"));

        let result = store
            .insert_many(Collection::Shops, vec![shop("A", "active"), bad])
            .await;
        assert!(result.is_err());
        let count = store.count(Collection::Shops, &ListQuery::new()).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_filters_and_order() {
        let store = MemoryStore::new();
        for (name, status) in [("Cone", "active"), ("Anvil", "active"), ("Brr", "closed")] {
            store.insert(Collection::Shops, shop(name, status)).await.unwrap();
        }

        let query = ListQuery::new()
            .eq("status", "active")
            .order_by("name", Direction::Desc);
        let rows = store.list(Collection::Shops, &query).await.unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["Cone", "Anvil"]);
    }

    #[tokio::test]
    async fn test_rejected_rows_are_not_stored() {
        let store = MemoryStore::new();
        let err = store
            .insert(Collection::Shops, shop("Bad", "bogus"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));

        let good = store.insert(Collection::Shops, shop("Good", "active")).await.unwrap();
        let id = row_id(&good).unwrap();
        let mut patch = Row::new();
        patch.insert("name".into(), Value::Null);
        let err = store.update(Collection::Shops, id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn { .. }));

        let mut patch = Row::new();
        patch.insert("featured".into(), json!("often"));
        let err = store.update(Collection::Shops, id, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));

        let rows = store.list(Collection::Shops, &ListQuery::new()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Good"));
        assert_eq!(rows[0]["featured"], json!(false));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let err = store.update(Collection::Shops, id, Row::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        let err = store.delete(Collection::Shops, id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_timestamps_compare_across_offsets() {
        let a = json!("2024-06-01T12:00:00Z");
        let b = json!("2024-06-01T07:00:00-05:00");
        assert_eq!(compare_values(&a, &b), Ordering::Equal);
    }
}
