//! Import audit log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{Collection, Record};

/// One row per import attempt that reached the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportLog {
    pub id: Uuid,
    pub import_type: String,
    pub filename: Option<String>,
    #[serde(default)]
    pub total_records: i32,
    #[serde(default)]
    pub successful_records: i32,
    #[serde(default)]
    pub failed_records: i32,
    #[serde(default)]
    pub errors: Vec<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Record for ImportLog {
    const COLLECTION: Collection = Collection::ImportLogs;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportLogDraft {
    pub import_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub total_records: i32,
    pub successful_records: i32,
    pub failed_records: i32,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
}
