//! Shared fixtures for backend integration tests
//!
//! Every test runs against a fresh in-memory store with a fake mailer.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use icecream_directory_backend::error::{AppError, AppResult};
use icecream_directory_backend::external::{MailMessage, MailSender};
use icecream_directory_backend::middleware::auth::Claims;
use icecream_directory_backend::models::{
    Event, Listing, ListingDraft, ListingStatus, ProfileDraft, UserProfile, UserRole,
};
use icecream_directory_backend::store::{Gateway, MemoryStore, Row};
use icecream_directory_backend::{AppState, Config};

pub const TEST_SECRET: &str = "development-secret-key";

// ============================================================================
// Mailers
// ============================================================================

/// Records every message it is asked to send
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    pub fn messages(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Fails every send
pub struct FailingMailer;

#[async_trait]
impl MailSender for FailingMailer {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        Err(AppError::ExternalService(format!(
            "{} unreachable",
            message.function_name()
        )))
    }
}

// ============================================================================
// State
// ============================================================================

pub fn state_with(mailer: Arc<dyn MailSender>) -> AppState {
    AppState::new(Arc::new(MemoryStore::new()), mailer, Config::default())
}

/// Fresh state plus a handle on the recording mailer
pub fn test_state() -> (AppState, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    (state_with(mailer.clone()), mailer)
}

// ============================================================================
// Seed Data
// ============================================================================

pub async fn seed_listing(gateway: &Gateway, name: &str, status: ListingStatus) -> Listing {
    let draft = ListingDraft {
        name: name.to_string(),
        address: format!("{} Main St", name.len()),
        city: Some("Chicago".to_string()),
        state: Some("IL".to_string()),
        status: Some(status),
        ..Default::default()
    };
    gateway.create::<Listing, _>(&draft).await.unwrap()
}

pub async fn seed_profile(gateway: &Gateway, name: &str, role: UserRole) -> UserProfile {
    let draft = ProfileDraft {
        user_id: Uuid::new_v4(),
        display_name: Some(name.to_string()),
        role: Some(role),
    };
    gateway.create::<UserProfile, _>(&draft).await.unwrap()
}

pub async fn seed_event(gateway: &Gateway, title: &str, days_from_now: i64) -> Event {
    let payload = json!({
        "title": title,
        "event_date": (Utc::now() + Duration::days(days_from_now)).to_rfc3339(),
        "location": "Millennium Park",
    });
    gateway.create::<Event, _>(&payload).await.unwrap()
}

/// Build a row from a JSON object literal
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

// ============================================================================
// Auth
// ============================================================================

/// Bearer token for an auth subject, signed with the test secret
pub fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        email: Some("someone@example.com".to_string()),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}
