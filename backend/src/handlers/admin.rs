//! Admin dashboard, collection management and CSV transfer handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::transfer::TransferKind;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Collection, ImportLog, Listing, ListingStatusPatch, UserRole};
use crate::services::dashboard::AdminStats;
use crate::services::import_export::ImportSummary;
use crate::services::records::MutationOutcome;
use crate::services::{DashboardService, ImportExportService, ListingService, RecordService};
use crate::store::Row;
use crate::AppState;

const IMPORT_HISTORY_LIMIT: usize = 20;

/// Response for a collection listing
#[derive(Serialize)]
pub struct CollectionResponse {
    pub collection: Collection,
    pub items: Vec<Value>,
}

#[derive(Serialize)]
pub struct ImportHistoryResponse {
    pub imports: Vec<ImportLog>,
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub filename: Option<String>,
}

fn parse_collection(slug: &str) -> Result<Collection, AppError> {
    slug.parse()
        .map_err(|_| AppError::NotFound("Collection".to_string()))
}

fn parse_kind(slug: &str) -> Result<TransferKind, AppError> {
    slug.parse().map_err(|e: String| AppError::validation("kind", e))
}

/// Counts, average rating and recent activity
pub async fn get_admin_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AdminStats>, AppError> {
    user.require(UserRole::Admin)?;

    let service = DashboardService::new(state.gateway.clone());
    Ok(Json(service.admin_stats().await?))
}

// ============================================================================
// Collections
// ============================================================================

pub async fn list_collection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<CollectionResponse>, AppError> {
    user.require(UserRole::Admin)?;
    let collection = parse_collection(&slug)?;

    let service = RecordService::new(state.gateway.clone());
    let items = service.list(collection).await?;

    Ok(Json(CollectionResponse { collection, items }))
}

pub async fn create_record(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
    Json(row): Json<Row>,
) -> Result<(StatusCode, Json<MutationOutcome>), AppError> {
    user.require(UserRole::Admin)?;
    let collection = parse_collection(&slug)?;

    let service = RecordService::new(state.gateway.clone());
    let outcome = service.create(collection, row).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn update_record(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((slug, id)): Path<(String, Uuid)>,
    Json(patch): Json<Row>,
) -> Result<Json<MutationOutcome>, AppError> {
    user.require(UserRole::Admin)?;
    let collection = parse_collection(&slug)?;

    let service = RecordService::new(state.gateway.clone());
    Ok(Json(service.update(collection, id, patch).await?))
}

pub async fn delete_record(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((slug, id)): Path<(String, Uuid)>,
) -> Result<Json<MutationOutcome>, AppError> {
    user.require(UserRole::Admin)?;
    let collection = parse_collection(&slug)?;

    let service = RecordService::new(state.gateway.clone());
    Ok(Json(service.delete(collection, id).await?))
}

/// Switch a listing between pending, active, suspended and closed
pub async fn set_listing_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<Uuid>,
    Json(patch): Json<ListingStatusPatch>,
) -> Result<Json<Listing>, AppError> {
    user.require(UserRole::Admin)?;

    let service = ListingService::new(state.gateway.clone());
    Ok(Json(service.set_status(listing_id, patch.status).await?))
}

// ============================================================================
// CSV Import / Export
// ============================================================================

/// Import a CSV body. Any bad row rejects the whole file.
pub async fn import_csv(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(kind): Path<String>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    user.require(UserRole::Admin)?;
    let kind = parse_kind(&kind)?;

    let service = ImportExportService::new(state.gateway.clone());
    let summary = service
        .import(kind, &body, query.filename, Some(user.user_id))
        .await?;

    Ok(Json(summary))
}

fn csv_attachment(filename: &str, csv: String) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    (
        [(header::CONTENT_TYPE, "text/csv".to_string()), (header::CONTENT_DISPOSITION, disposition)],
        csv,
    )
        .into_response()
}

pub async fn export_csv(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(kind): Path<String>,
) -> Result<Response, AppError> {
    user.require(UserRole::Admin)?;
    let kind = parse_kind(&kind)?;

    let service = ImportExportService::new(state.gateway.clone());
    let csv = service.export(kind).await?;

    Ok(csv_attachment(&kind.export_filename(), csv))
}

pub async fn get_import_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(kind): Path<String>,
) -> Result<Response, AppError> {
    user.require(UserRole::Admin)?;
    let kind = parse_kind(&kind)?;

    let service = ImportExportService::new(state.gateway.clone());
    let csv = service.template(kind)?;

    Ok(csv_attachment(&format!("{}_template.csv", kind.slug()), csv))
}

/// Recent import attempts
pub async fn list_imports(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ImportHistoryResponse>, AppError> {
    user.require(UserRole::Admin)?;

    let service = ImportExportService::new(state.gateway.clone());
    let imports = service.history(IMPORT_HISTORY_LIMIT).await?;

    Ok(Json(ImportHistoryResponse { imports }))
}
