//! Postgres-backed record store
//!
//! Rows cross the wire as `jsonb`: reads use `to_jsonb(t.*)` and writes go
//! through `jsonb_populate_record`, which casts every key to its column type.
//! Column names are checked against the collection catalogue before they are
//! spliced into SQL.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{check_row, Direction, Filter, ListQuery, RecordStore, Row, StoreError, StoreResult};
use shared::Collection;

/// Record store over a sqlx connection pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    /// Create a new PgStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn quoted(column: &str) -> String {
    format!("\"{}\"", column)
}

fn into_row(collection: Collection, value: Value) -> StoreResult<Row> {
    match value {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Malformed {
            collection,
            message: format!("expected a row object, got {}", other),
        }),
    }
}

/// `(jsonb_populate_record(NULL::table, $n)).column` for a one-key object,
/// giving a value of the column's own type to compare against.
fn push_typed_value(qb: &mut QueryBuilder<'static, Postgres>, collection: Collection, column: &str, value: &Value) {
    let mut single = Row::new();
    single.insert(column.to_string(), value.clone());
    qb.push("(jsonb_populate_record(NULL::")
        .push(collection.table())
        .push(", ")
        .push_bind(Json(Value::Object(single)))
        .push(")).")
        .push(quoted(column));
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, collection: Collection, filters: &[Filter]) {
    qb.push(" WHERE TRUE");
    for filter in filters {
        qb.push(" AND t.").push(quoted(filter.column()));
        match filter {
            Filter::Eq(_, value) if value.is_null() => {
                qb.push(" IS NULL");
            }
            Filter::Eq(column, value) => {
                qb.push(" = ");
                push_typed_value(qb, collection, column, value);
            }
            Filter::Gte(column, value) => {
                qb.push(" >= ");
                push_typed_value(qb, collection, column, value);
            }
            Filter::In(column, values) => {
                if values.is_empty() {
                    qb.push(" IS NULL AND FALSE");
                    continue;
                }
                qb.push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    push_typed_value(qb, collection, column, value);
                }
                qb.push(")");
            }
        }
    }
}

fn select_builder(collection: Collection, query: &ListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT to_jsonb(t.*) FROM ");
    qb.push(collection.table()).push(" AS t");
    push_filters(&mut qb, collection, &query.filters);

    if !query.order.is_empty() {
        qb.push(" ORDER BY ");
        for (i, (column, direction)) in query.order.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push("t.").push(quoted(column)).push(match direction {
                Direction::Asc => " ASC NULLS LAST",
                Direction::Desc => " DESC NULLS LAST",
            });
        }
    }

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ").push_bind(limit as i64);
    }
    qb
}

fn insert_builder(collection: Collection, row: Row) -> QueryBuilder<'static, Postgres> {
    let columns: Vec<String> = row.keys().map(|c| quoted(c)).collect();
    let mut qb = QueryBuilder::new("INSERT INTO ");
    qb.push(collection.table()).push(" AS t ");

    if columns.is_empty() {
        qb.push("DEFAULT VALUES");
    } else {
        qb.push("(")
            .push(columns.join(", "))
            .push(") SELECT ")
            .push(
                columns
                    .iter()
                    .map(|c| format!("r.{}", c))
                    .collect::<Vec<_>>()
                    .join(", "),
            )
            .push(" FROM jsonb_populate_record(NULL::")
            .push(collection.table())
            .push(", ")
            .push_bind(Json(Value::Object(row)))
            .push(") AS r");
    }
    qb.push(" RETURNING to_jsonb(t.*)");
    qb
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list(&self, collection: Collection, query: &ListQuery) -> StoreResult<Vec<Row>> {
        query.check(collection)?;
        let mut qb = select_builder(collection, query);
        let values: Vec<Value> = qb.build_query_scalar().fetch_all(&self.db).await?;
        values.into_iter().map(|v| into_row(collection, v)).collect()
    }

    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Row>> {
        let mut qb = QueryBuilder::new("SELECT to_jsonb(t.*) FROM ");
        qb.push(collection.table())
            .push(" AS t WHERE t.id = ")
            .push_bind(id);
        let value: Option<Value> = qb.build_query_scalar().fetch_optional(&self.db).await?;
        value.map(|v| into_row(collection, v)).transpose()
    }

    async fn insert(&self, collection: Collection, row: Row) -> StoreResult<Row> {
        check_row(collection, &row, true)?;
        let mut qb = insert_builder(collection, row);
        let value: Value = qb.build_query_scalar().fetch_one(&self.db).await?;
        into_row(collection, value)
    }

    async fn insert_many(&self, collection: Collection, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        for row in &rows {
            check_row(collection, row, true)?;
        }

        let mut tx = self.db.begin().await?;
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let mut qb = insert_builder(collection, row);
            let value: Value = qb.build_query_scalar().fetch_one(&mut *tx).await?;
            inserted.push(into_row(collection, value)?);
        }
        tx.commit().await?;

        Ok(inserted)
    }

    async fn update(&self, collection: Collection, id: Uuid, mut patch: Row) -> StoreResult<Row> {
        patch.remove("id");
        patch.remove("created_at");
        patch.remove("updated_at");
        check_row(collection, &patch, false)?;

        let mut assignments: Vec<String> = patch
            .keys()
            .map(|c| format!("{col} = r.{col}", col = quoted(c)))
            .collect();
        if collection.has_updated_at() {
            assignments.push("\"updated_at\" = now()".to_string());
        }
        if assignments.is_empty() {
            assignments.push("\"id\" = t.\"id\"".to_string());
        }

        let mut qb = QueryBuilder::new("UPDATE ");
        qb.push(collection.table())
            .push(" AS t SET ")
            .push(assignments.join(", "))
            .push(" FROM jsonb_populate_record(NULL::")
            .push(collection.table())
            .push(", ")
            .push_bind(Json(Value::Object(patch)))
            .push(") AS r WHERE t.id = ")
            .push_bind(id)
            .push(" RETURNING to_jsonb(t.*)");

        let value: Option<Value> = qb.build_query_scalar().fetch_optional(&self.db).await?;
        match value {
            Some(value) => into_row(collection, value),
            None => Err(StoreError::NotFound { collection, id }),
        }
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let mut qb = QueryBuilder::new("DELETE FROM ");
        qb.push(collection.table()).push(" WHERE id = ").push_bind(id);
        let result = qb.build().execute(&self.db).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { collection, id });
        }
        Ok(())
    }

    async fn count(&self, collection: Collection, query: &ListQuery) -> StoreResult<u64> {
        query.check(collection)?;
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(collection.table()).push(" AS t");
        push_filters(&mut qb, collection, &query.filters);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.db).await?;
        Ok(count.max(0) as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
