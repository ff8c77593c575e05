//! Bulk CSV import and export
//!
//! Imports parse and validate the whole file before anything is written, then
//! submit every row in one all-or-nothing insert. Exports dump the full
//! collection restricted to the same column allow-list.

use serde::Serialize;
use serde_json::Value;
use shared::transfer::{self, TransferKind};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ImportLog, ImportLogDraft, PLATFORM_WIDE_SHOP_ID};
use crate::store::{Direction, Gateway, ListQuery, Row};

/// Outcome of a successful import
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub kind: TransferKind,
    pub imported: usize,
}

/// Import/export service
#[derive(Clone)]
pub struct ImportExportService {
    gateway: Gateway,
}

impl ImportExportService {
    /// Create a new ImportExportService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Import a CSV document. A bad row rejects the file and commits nothing.
    pub async fn import(
        &self,
        kind: TransferKind,
        csv: &str,
        filename: Option<String>,
        actor: Option<Uuid>,
    ) -> AppResult<ImportSummary> {
        let mut rows = transfer::parse_csv(kind, csv)?;

        if kind == TransferKind::Coupons {
            for row in &mut rows {
                row.insert(
                    "shop_id".to_string(),
                    Value::String(PLATFORM_WIDE_SHOP_ID.to_string()),
                );
            }
        }

        let total = rows.len();
        if total == 0 {
            tracing::info!(%kind, "import file contained no rows");
            return Ok(ImportSummary { kind, imported: 0 });
        }

        let result = self.gateway.raw().insert_many(kind.collection(), rows).await;
        let (imported, errors) = match &result {
            Ok(inserted) => (inserted.len(), vec![]),
            Err(e) => (0, vec![e.to_string()]),
        };

        self.write_log(ImportLogDraft {
            import_type: kind.slug().to_string(),
            filename,
            total_records: total as i32,
            successful_records: imported as i32,
            failed_records: (total - imported) as i32,
            errors,
            created_by: actor,
        })
        .await;

        result?;
        tracing::info!(%kind, imported, "import committed");
        Ok(ImportSummary { kind, imported })
    }

    /// Best effort: a failed log write does not fail the import
    async fn write_log(&self, draft: ImportLogDraft) {
        if let Err(e) = self.gateway.create::<ImportLog, _>(&draft).await {
            tracing::warn!(error = %e, "failed to write import log");
        }
    }

    /// Export the whole collection as CSV
    pub async fn export(&self, kind: TransferKind) -> AppResult<String> {
        let query = ListQuery::new().order_by("created_at", Direction::Asc);
        let rows: Vec<Row> = self.gateway.raw().list(kind.collection(), &query).await?;
        tracing::info!(%kind, rows = rows.len(), "export");
        Ok(transfer::write_csv(kind, &rows)?)
    }

    /// Header row plus one sample row
    pub fn template(&self, kind: TransferKind) -> AppResult<String> {
        transfer::sample_csv(kind).map_err(AppError::from)
    }

    /// Recent import attempts, newest first
    pub async fn history(&self, limit: usize) -> AppResult<Vec<ImportLog>> {
        let query = ListQuery::new()
            .order_by("created_at", Direction::Desc)
            .limit(limit);
        Ok(self.gateway.list::<ImportLog>(&query).await?)
    }
}
