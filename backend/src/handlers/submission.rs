//! Shop submission handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{NewShopSubmission, ShopSubmission, SubmissionStatus, UserRole};
use crate::services::submission::Approval;
use crate::services::SubmissionService;
use crate::AppState;

/// Response for list of submissions
#[derive(Serialize)]
pub struct SubmissionsResponse {
    pub submissions: Vec<ShopSubmission>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionQuery {
    pub status: Option<SubmissionStatus>,
    pub search: Option<String>,
}

fn submission_service(state: &AppState) -> SubmissionService {
    SubmissionService::new(state.gateway.clone(), state.notifications.clone())
}

/// Public "add your shop" form
pub async fn submit_shop(
    State(state): State<AppState>,
    Json(input): Json<NewShopSubmission>,
) -> Result<(StatusCode, Json<ShopSubmission>), AppError> {
    let submission = submission_service(&state).submit(input).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn list_submissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<SubmissionsResponse>, AppError> {
    user.require(UserRole::Admin)?;

    let submissions = submission_service(&state)
        .list(query.status, query.search.as_deref())
        .await?;

    Ok(Json(SubmissionsResponse {
        total: submissions.len(),
        submissions,
    }))
}

/// Approve a pending submission, creating a pending listing
pub async fn approve_submission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(submission_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Approval>), AppError> {
    user.require(UserRole::Admin)?;

    let approval = submission_service(&state).approve(submission_id).await?;
    Ok((StatusCode::CREATED, Json(approval)))
}

pub async fn reject_submission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(submission_id): Path<Uuid>,
) -> Result<Json<ShopSubmission>, AppError> {
    user.require(UserRole::Admin)?;

    let submission = submission_service(&state).reject(submission_id).await?;
    Ok(Json(submission))
}
