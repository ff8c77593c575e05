//! Event and registration service

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::mail_functions::{
    EventMarketingMail, EventRegistrationMail, MailMessage, Recipient,
};
use crate::models::{Event, EventRegistration, EventTiming, NewRegistration, RegistrationDraft};
use crate::services::notification::{BlastReport, NotificationService};
use crate::store::{Direction, Gateway, ListQuery};

/// Placeholder substituted with each recipient's name
const NAME_PLACEHOLDER: &str = "{name}";

/// Event service
#[derive(Clone)]
pub struct EventService {
    gateway: Gateway,
    notifications: NotificationService,
}

/// Event detail payload
#[derive(Debug, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub timing: EventTiming,
    pub registration_count: u64,
}

/// A committed registration and its pending confirmation mail
pub struct Registered {
    pub registration: EventRegistration,
    /// Resolves to whether the confirmation was delivered
    pub confirmation: JoinHandle<bool>,
}

/// Admin registrations table row
#[derive(Debug, Serialize)]
pub struct RegistrationRow {
    #[serde(flatten)]
    pub registration: EventRegistration,
    pub event_title: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
}

/// Marketing blast input
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MarketingRequest {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub content: String,
}

/// Personalize marketing copy; an empty name becomes "there"
pub fn personalize(template: &str, name: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() { "there" } else { name };
    template.replace(NAME_PLACEHOLDER, name)
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(gateway: Gateway, notifications: NotificationService) -> Self {
        Self {
            gateway,
            notifications,
        }
    }

    /// All events by start date, past ones included
    pub async fn list(&self) -> AppResult<Vec<Event>> {
        let query = ListQuery::new().order_by("event_date", Direction::Asc);
        Ok(self.gateway.list::<Event>(&query).await?)
    }

    /// Events starting from now on, soonest first
    pub async fn upcoming(&self) -> AppResult<Vec<Event>> {
        let query = ListQuery::new()
            .gte("event_date", Utc::now())
            .order_by("event_date", Direction::Asc);
        Ok(self.gateway.list::<Event>(&query).await?)
    }

    pub async fn detail(&self, id: Uuid) -> AppResult<EventDetail> {
        let event = self.gateway.fetch::<Event>(id).await?;
        let registration_count = self.registration_count(id).await?;
        Ok(EventDetail {
            timing: event.timing(Utc::now()),
            event,
            registration_count,
        })
    }

    pub async fn registration_count(&self, event_id: Uuid) -> AppResult<u64> {
        let query = ListQuery::new().eq("event_id", event_id);
        Ok(self.gateway.count::<EventRegistration>(&query).await?)
    }

    /// Register for an event, then send the confirmation in the background.
    /// A failed confirmation does not undo the registration.
    pub async fn register(
        &self,
        event_id: Uuid,
        input: NewRegistration,
        user_id: Option<Uuid>,
    ) -> AppResult<Registered> {
        input.validate()?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "Name is required"));
        }

        let event = self.gateway.fetch::<Event>(event_id).await?;
        let draft = RegistrationDraft {
            event_id,
            name: name.to_string(),
            email: input.email.trim().to_string(),
            user_id,
        };
        let registration = self.gateway.create::<EventRegistration, _>(&draft).await?;
        tracing::info!(registration_id = %registration.id, %event_id, "event registration created");

        let confirmation = self
            .notifications
            .dispatch(MailMessage::EventRegistration(EventRegistrationMail {
                name: registration.name.clone(),
                email: registration.email.clone(),
                event_title: event.title.clone(),
                event_date: event.event_date.to_rfc3339(),
                event_location: event.location.clone().unwrap_or_default(),
            }));

        Ok(Registered {
            registration,
            confirmation,
        })
    }

    /// Registrations newest first, optionally for one event and matching a
    /// name/email search
    pub async fn list_registrations(
        &self,
        event_id: Option<Uuid>,
        search: Option<&str>,
    ) -> AppResult<Vec<RegistrationRow>> {
        let mut query = ListQuery::new().order_by("created_at", Direction::Desc);
        if let Some(event_id) = event_id {
            query = query.eq("event_id", event_id);
        }
        let registrations = self.gateway.list::<EventRegistration>(&query).await?;
        let events = self.list().await?;

        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        Ok(registrations
            .into_iter()
            .filter(|r| {
                needle.is_empty()
                    || r.name.to_lowercase().contains(&needle)
                    || r.email.to_lowercase().contains(&needle)
            })
            .map(|registration| {
                let event = events.iter().find(|e| e.id == registration.event_id);
                RegistrationRow {
                    event_title: event.map(|e| e.title.clone()),
                    event_date: event.map(|e| e.event_date),
                    registration,
                }
            })
            .collect())
    }

    /// Registrations as a CSV attachment
    pub async fn export_registrations(
        &self,
        event_id: Option<Uuid>,
        search: Option<&str>,
    ) -> AppResult<String> {
        let rows = self.list_registrations(event_id, search).await?;

        let mut writer = csv::Writer::from_writer(vec![]);
        let csv_error = |e: csv::Error| AppError::Internal(format!("CSV write failed: {}", e));
        writer
            .write_record(["Name", "Email", "Event", "Event Date", "Registration Date"])
            .map_err(csv_error)?;
        for row in &rows {
            let event_date = row.event_date.map(|d| d.to_rfc3339()).unwrap_or_default();
            writer
                .write_record([
                    row.registration.name.as_str(),
                    row.registration.email.as_str(),
                    row.event_title.as_deref().unwrap_or(""),
                    event_date.as_str(),
                    row.registration.created_at.to_rfc3339().as_str(),
                ])
                .map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
    }

    pub async fn delete_registration(&self, id: Uuid) -> AppResult<()> {
        self.gateway.delete::<EventRegistration>(id).await?;
        tracing::info!(registration_id = %id, "registration deleted");
        Ok(())
    }

    /// Mail every registrant of an event, one message each. Duplicate
    /// addresses receive a single copy.
    pub async fn send_marketing(
        &self,
        event_id: Uuid,
        request: &MarketingRequest,
    ) -> AppResult<BlastReport> {
        request.validate()?;
        self.gateway.fetch::<Event>(event_id).await?;

        let query = ListQuery::new()
            .eq("event_id", event_id)
            .order_by("created_at", Direction::Asc);
        let registrations = self.gateway.list::<EventRegistration>(&query).await?;

        let mut seen = HashSet::new();
        let messages: Vec<MailMessage> = registrations
            .into_iter()
            .filter(|r| seen.insert(r.email.trim().to_lowercase()))
            .map(|r| {
                MailMessage::EventMarketing(EventMarketingMail {
                    subject: personalize(&request.subject, &r.name),
                    content: personalize(&request.content, &r.name),
                    recipients: vec![Recipient {
                        name: r.name,
                        email: r.email,
                    }],
                    event_id,
                })
            })
            .collect();

        let report = self.notifications.send_all(messages).await;
        tracing::info!(
            %event_id,
            total = report.total,
            sent = report.sent,
            failed = report.failed,
            "marketing blast finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personalize() {
        assert_eq!(personalize("Hi {name}!", "Dana"), "Hi Dana!");
        assert_eq!(personalize("Hi {name}!", "  "), "Hi there!");
        assert_eq!(personalize("No placeholder", "Dana"), "No placeholder");
    }
}
