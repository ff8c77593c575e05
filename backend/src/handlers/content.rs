//! Content page and contact form handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::models::{ContactInquiry, NewContactInquiry, Page};
use crate::services::{ContactService, PageService};
use crate::AppState;

/// Published page by slug
pub async fn get_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Page>, AppError> {
    let service = PageService::new(state.gateway.clone());
    Ok(Json(service.published(&slug).await?))
}

/// Contact form submission
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(input): Json<NewContactInquiry>,
) -> Result<(StatusCode, Json<ContactInquiry>), AppError> {
    let service = ContactService::new(state.gateway.clone());
    let inquiry = service.submit(input).await?;

    Ok((StatusCode::CREATED, Json(inquiry)))
}
