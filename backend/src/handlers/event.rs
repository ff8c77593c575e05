//! Event and registration handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{CurrentUser, MaybeUser};
use crate::models::{Event, EventRegistration, NewRegistration, UserRole};
use crate::services::event::{EventDetail, MarketingRequest, RegistrationRow};
use crate::services::notification::BlastReport;
use crate::services::EventService;
use crate::AppState;

/// Response for list of events
#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

/// Response for list of registrations
#[derive(Serialize)]
pub struct RegistrationsResponse {
    pub registrations: Vec<RegistrationRow>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationQuery {
    pub event_id: Option<Uuid>,
    pub search: Option<String>,
    pub format: Option<String>,
}

fn event_service(state: &AppState) -> EventService {
    EventService::new(state.gateway.clone(), state.notifications.clone())
}

/// Upcoming events by start date
pub async fn list_events(State(state): State<AppState>) -> Result<Json<EventsResponse>, AppError> {
    let events = event_service(&state).upcoming().await?;
    Ok(Json(EventsResponse { events }))
}

/// Event detail with timing and registration count
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventDetail>, AppError> {
    Ok(Json(event_service(&state).detail(event_id).await?))
}

/// Register for an event; a signed-in user is linked to the registration
pub async fn register_for_event(
    State(state): State<AppState>,
    MaybeUser(user_id): MaybeUser,
    Path(event_id): Path<Uuid>,
    Json(input): Json<NewRegistration>,
) -> Result<(StatusCode, Json<EventRegistration>), AppError> {
    let registered = event_service(&state)
        .register(event_id, input, user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(registered.registration)))
}

// ============================================================================
// Admin
// ============================================================================

/// List registrations, or download them as CSV with `format=csv`
pub async fn list_registrations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RegistrationQuery>,
) -> Result<Response, AppError> {
    user.require(UserRole::Admin)?;

    let service = event_service(&state);
    let search = query.search.as_deref();

    if query.format.as_deref() == Some("csv") {
        let csv = service.export_registrations(query.event_id, search).await?;
        Ok((
            [(header::CONTENT_TYPE, "text/csv"), (header::CONTENT_DISPOSITION, "attachment; filename=\"event_registrations.csv\"")],
            csv,
        ).into_response())
    } else {
        let registrations = service.list_registrations(query.event_id, search).await?;
        Ok(Json(RegistrationsResponse {
            total: registrations.len(),
            registrations,
        })
        .into_response())
    }
}

pub async fn delete_registration(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(registration_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    user.require(UserRole::Admin)?;

    event_service(&state)
        .delete_registration(registration_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Send a marketing mail to every registrant of an event
pub async fn send_event_marketing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<Uuid>,
    Json(request): Json<MarketingRequest>,
) -> Result<Json<BlastReport>, AppError> {
    user.require(UserRole::Admin)?;

    let report = event_service(&state)
        .send_marketing(event_id, &request)
        .await?;

    Ok(Json(report))
}
