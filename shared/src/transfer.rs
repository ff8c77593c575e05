//! CSV transfer format for bulk import and export
//!
//! Each transferable collection has one allow-list of columns used for both
//! directions, so an export can be fed straight back into an import.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::Collection;
use crate::types::{ListingStatus, PriceLevel};

/// A row as exchanged with the record store
pub type Row = Map<String, Value>;

/// Collections that support CSV import/export
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Shops,
    Events,
    Coupons,
}

/// Target type a CSV cell is coerced into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Decimal,
    Float,
    Boolean,
    Timestamp,
    Price,
    Status,
}

impl ColumnType {
    fn expected(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "a whole number",
            ColumnType::Decimal => "a decimal amount",
            ColumnType::Float => "a number",
            ColumnType::Boolean => "true or false",
            ColumnType::Timestamp => "a date or RFC 3339 timestamp",
            ColumnType::Price => "one of $, $$, $$$, $$$$",
            ColumnType::Status => "one of pending, active, suspended, closed",
        }
    }
}

/// An allow-listed column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferColumn {
    pub name: &'static str,
    pub kind: ColumnType,
}

const fn col(name: &'static str, kind: ColumnType) -> TransferColumn {
    TransferColumn { name, kind }
}

const SHOP_COLUMNS: &[TransferColumn] = &[
    col("name", ColumnType::Text),
    col("address", ColumnType::Text),
    col("city", ColumnType::Text),
    col("state", ColumnType::Text),
    col("zip_code", ColumnType::Text),
    col("phone", ColumnType::Text),
    col("pricing", ColumnType::Price),
    col("website_url", ColumnType::Text),
    col("facebook_url", ColumnType::Text),
    col("instagram_url", ColumnType::Text),
    col("twitter_url", ColumnType::Text),
    col("description", ColumnType::Text),
    col("status", ColumnType::Status),
    col("latitude", ColumnType::Float),
    col("longitude", ColumnType::Float),
    col("seo_title", ColumnType::Text),
    col("seo_description", ColumnType::Text),
    col("seo_keywords", ColumnType::Text),
];

const EVENT_COLUMNS: &[TransferColumn] = &[
    col("title", ColumnType::Text),
    col("description", ColumnType::Text),
    col("event_date", ColumnType::Timestamp),
    col("end_date", ColumnType::Timestamp),
    col("location", ColumnType::Text),
    col("is_featured", ColumnType::Boolean),
    col("image_url", ColumnType::Text),
    col("registration_url", ColumnType::Text),
    col("seo_title", ColumnType::Text),
    col("seo_description", ColumnType::Text),
    col("seo_keywords", ColumnType::Text),
];

const COUPON_COLUMNS: &[TransferColumn] = &[
    col("title", ColumnType::Text),
    col("description", ColumnType::Text),
    col("coupon_code", ColumnType::Text),
    col("discount_percent", ColumnType::Integer),
    col("discount_amount", ColumnType::Decimal),
    col("valid_from", ColumnType::Timestamp),
    col("valid_until", ColumnType::Timestamp),
    col("terms_conditions", ColumnType::Text),
    col("usage_limit", ColumnType::Integer),
    col("is_active", ColumnType::Boolean),
    col("seo_title", ColumnType::Text),
    col("seo_description", ColumnType::Text),
    col("seo_keywords", ColumnType::Text),
];

impl TransferKind {
    pub const ALL: [TransferKind; 3] = [TransferKind::Shops, TransferKind::Events, TransferKind::Coupons];

    pub fn slug(&self) -> &'static str {
        match self {
            TransferKind::Shops => "shops",
            TransferKind::Events => "events",
            TransferKind::Coupons => "coupons",
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            TransferKind::Shops => Collection::Shops,
            TransferKind::Events => Collection::Events,
            TransferKind::Coupons => Collection::Coupons,
        }
    }

    /// Allow-listed columns, in header order
    pub fn columns(&self) -> &'static [TransferColumn] {
        match self {
            TransferKind::Shops => SHOP_COLUMNS,
            TransferKind::Events => EVENT_COLUMNS,
            TransferKind::Coupons => COUPON_COLUMNS,
        }
    }

    pub fn header(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name).collect()
    }

    /// Fields every imported row must carry
    pub fn required(&self) -> &'static [&'static str] {
        match self {
            TransferKind::Shops => &["name", "address"],
            TransferKind::Events => &["title", "event_date"],
            TransferKind::Coupons => &["title", "description", "valid_until"],
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static TransferColumn> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Download filename for exports
    pub fn export_filename(&self) -> String {
        format!("{}_export.csv", self.slug())
    }

    fn sample_row(&self) -> &'static [&'static str] {
        match self {
            TransferKind::Shops => &[
                "Sample Ice Cream Shop",
                "123 Main St",
                "Chicago",
                "IL",
                "60601",
                "(312) 555-0123",
                "$$",
                "https://example.com",
                "",
                "",
                "",
                "Delicious homemade ice cream",
                "active",
                "41.8781",
                "-87.6298",
                "",
                "",
                "",
            ],
            TransferKind::Events => &[
                "Summer Ice Cream Festival",
                "Tastings from local shops",
                "2024-07-15T12:00:00Z",
                "2024-07-15T18:00:00Z",
                "Millennium Park",
                "false",
                "",
                "",
                "",
                "",
                "",
            ],
            TransferKind::Coupons => &[
                "20% Off Any Sundae",
                "Valid at participating shops",
                "SUNDAE20",
                "20",
                "",
                "",
                "2024-12-31T23:59:59Z",
                "One per customer",
                "100",
                "true",
                "",
                "",
                "",
            ],
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TransferKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransferKind::ALL
            .into_iter()
            .find(|k| k.slug() == s)
            .ok_or_else(|| format!("'{}' does not support import/export", s))
    }
}

/// Import/export failures. Any row error rejects the whole file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: String },

    #[error("Row {row}: invalid value '{value}' for '{field}' (expected {expected})")]
    InvalidValue {
        row: usize,
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("CSV error: {0}")]
    Csv(String),
}

impl TransferError {
    pub fn field(&self) -> Option<&str> {
        match self {
            TransferError::MissingField { field, .. } | TransferError::InvalidValue { field, .. } => {
                Some(field.as_str())
            }
            TransferError::Csv(_) => None,
        }
    }
}

impl From<csv::Error> for TransferError {
    fn from(err: csv::Error) -> Self {
        TransferError::Csv(err.to_string())
    }
}

// ============================================================================
// Import
// ============================================================================

/// Coerce one non-empty cell to its column type. Text keeps its spacing;
/// every other type is parsed from the trimmed cell.
pub fn coerce(kind: ColumnType, cell: &str) -> Result<Value, &'static str> {
    let raw = cell.trim();
    let value = match kind {
        ColumnType::Text => Value::String(cell.to_string()),
        ColumnType::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| kind.expected())?,
        ColumnType::Decimal => raw
            .trim_start_matches('$')
            .parse::<Decimal>()
            .map(|d| Value::String(d.to_string()))
            .map_err(|_| kind.expected())?,
        ColumnType::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or(kind.expected())?,
        ColumnType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Value::Bool(true),
            "false" | "no" | "0" => Value::Bool(false),
            _ => return Err(kind.expected()),
        },
        ColumnType::Timestamp => parse_timestamp(raw)
            .map(|ts| Value::String(ts.to_rfc3339()))
            .ok_or(kind.expected())?,
        ColumnType::Price => PriceLevel::from_str(raw)
            .map(|p| Value::String(p.as_str().to_string()))
            .map_err(|_| kind.expected())?,
        ColumnType::Status => ListingStatus::from_str(raw)
            .map(|s| Value::String(s.as_str().to_string()))
            .map_err(|_| kind.expected())?,
    };
    Ok(value)
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM` and bare dates (UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a CSV document into store rows for `kind`.
///
/// Columns outside the allow-list are dropped and blank cells are omitted so
/// store defaults apply. Headers are trimmed but text cells are kept as
/// written. The first bad row aborts the whole parse.
pub fn parse_csv(kind: TransferKind, text: &str) -> Result<Vec<Row>, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<Option<&'static TransferColumn>> = reader
        .headers()?
        .iter()
        .map(|h| {
            let name = h.trim_start_matches('\u{feff}').trim().to_ascii_lowercase();
            kind.column(&name)
        })
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row_number = index + 1;
        let mut row = Row::new();

        for (cell, column) in record.iter().zip(headers.iter()) {
            let Some(column) = column else { continue };
            if cell.trim().is_empty() {
                continue;
            }
            let value = coerce(column.kind, cell).map_err(|expected| TransferError::InvalidValue {
                row: row_number,
                field: column.name.to_string(),
                value: cell.to_string(),
                expected,
            })?;
            row.insert(column.name.to_string(), value);
        }

        if row.is_empty() {
            continue;
        }

        if let Some(field) = kind.required().iter().find(|f| !row.contains_key(**f)) {
            return Err(TransferError::MissingField {
                row: row_number,
                field: field.to_string(),
            });
        }

        rows.push(row);
    }

    Ok(rows)
}

// ============================================================================
// Export
// ============================================================================

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Serialize rows with the allow-list as header; nulls become empty cells
pub fn write_csv(kind: TransferKind, rows: &[Row]) -> Result<String, TransferError> {
    let header = kind.header();
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(&header)?;

    for row in rows {
        let cells: Vec<String> = header.iter().map(|name| cell_text(row.get(*name))).collect();
        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TransferError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TransferError::Csv(e.to_string()))
}

/// Header plus one illustrative row
pub fn sample_csv(kind: TransferKind) -> Result<String, TransferError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(kind.header())?;
    writer.write_record(kind.sample_row())?;
    let bytes = writer
        .into_inner()
        .map_err(|e| TransferError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| TransferError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_columns_dropped() {
        let csv = "name,address,secret_column\nScoops,1 Main St,drop me\n";
        let rows = parse_csv(TransferKind::Shops, csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].contains_key("secret_column"));
        assert_eq!(rows[0]["name"], json!("Scoops"));
    }

    #[test]
    fn test_missing_required_field_names_row() {
        let csv = "title,event_date\nOpen House,2024-06-01\nNo Date,\n";
        let err = parse_csv(TransferKind::Events, csv).unwrap_err();
        assert_eq!(
            err,
            TransferError::MissingField {
                row: 2,
                field: "event_date".to_string()
            }
        );
    }

    #[test]
    fn test_cells_are_coerced() {
        let csv = "title,description,valid_until,discount_percent,is_active,discount_amount\n\
                   Deal,Half off,2024-12-31,50,yes,$2.50\n";
        let rows = parse_csv(TransferKind::Coupons, csv).unwrap();
        let row = &rows[0];
        assert_eq!(row["discount_percent"], json!(50));
        assert_eq!(row["is_active"], json!(true));
        assert_eq!(row["discount_amount"], json!("2.50"));
        assert_eq!(row["valid_until"], json!("2024-12-31T00:00:00+00:00"));
    }

    #[test]
    fn test_bad_cell_rejected() {
        let csv = "name,address,pricing\nScoops,1 Main St,cheap\n";
        let err = parse_csv(TransferKind::Shops, csv).unwrap_err();
        assert_eq!(err.field(), Some("pricing"));
    }

    #[test]
    fn test_text_cells_keep_spacing() {
        let csv = " name , address ,latitude,description\n\
                   Scoops,1 Main St, 41.5 ,\"  Two  scoops \"\n";
        let rows = parse_csv(TransferKind::Shops, csv).unwrap();
        let row = &rows[0];
        assert_eq!(row["name"], json!("Scoops"));
        assert_eq!(row["latitude"], json!(41.5));
        assert_eq!(row["description"], json!("  Two  scoops "));

        let out = write_csv(TransferKind::Shops, &rows).unwrap();
        let again = parse_csv(TransferKind::Shops, &out).unwrap();
        assert_eq!(again[0]["description"], json!("  Two  scoops "));
    }

    #[test]
    fn test_whitespace_only_required_cell_is_missing() {
        let csv = "name,address\nScoops,   \n";
        let err = parse_csv(TransferKind::Shops, csv).unwrap_err();
        assert_eq!(err.field(), Some("address"));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let csv = "name,address\n\nScoops,1 Main St\n,\n";
        let rows = parse_csv(TransferKind::Shops, csv).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_export_writes_allow_list_header() {
        let mut row = Row::new();
        row.insert("name".to_string(), json!("Scoops, Inc."));
        row.insert("address".to_string(), json!("1 Main St"));
        row.insert("latitude".to_string(), json!(41.5));
        row.insert("phone".to_string(), Value::Null);
        row.insert("owner_email".to_string(), json!("hidden@example.com"));

        let csv = write_csv(TransferKind::Shops, &[row]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), TransferKind::Shops.header().join(","));
        let data = lines.next().unwrap();
        assert!(data.starts_with("\"Scoops, Inc.\",1 Main St,"));
        assert!(data.contains("41.5"));
        assert!(!csv.contains("hidden@example.com"));
    }

    #[test]
    fn test_sample_templates_import_cleanly() {
        for kind in TransferKind::ALL {
            let sample = sample_csv(kind).unwrap();
            let rows = parse_csv(kind, &sample).unwrap();
            assert_eq!(rows.len(), 1, "{}", kind);
        }
    }
}
