//! Event and registration models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{Collection, Record};

/// A community event, optionally hosted by a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub shop_id: Option<Uuid>,
    #[serde(default)]
    pub is_featured: bool,
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    pub registration_url: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Event {
    const COLLECTION: Collection = Collection::Events;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Where an event sits relative to now
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventTiming {
    Upcoming,
    Ongoing,
    Past,
}

impl Event {
    /// Upcoming when it starts after `now`; past once both start and end
    /// (if any) are behind `now`; ongoing otherwise.
    pub fn timing(&self, now: DateTime<Utc>) -> EventTiming {
        if self.event_date > now {
            return EventTiming::Upcoming;
        }
        let ended = match self.end_date {
            None => true,
            Some(end) => end < now,
        };
        if self.event_date < now && ended {
            EventTiming::Past
        } else {
            EventTiming::Ongoing
        }
    }
}

/// A person signed up for an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for EventRegistration {
    const COLLECTION: Collection = Collection::EventRegistrations;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Public registration form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRegistration {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(custom = "crate::validation::email_shape")]
    pub email: String,
}

/// Insert payload for a registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}
