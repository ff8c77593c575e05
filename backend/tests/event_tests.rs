//! Event and registration tests
//!
//! Tests for event registration and mail including:
//! - Two registrations for one event both persist
//! - A failing mailer never undoes a registration
//! - Marketing blasts reach each address once

mod common;

use std::sync::Arc;

use icecream_directory_backend::external::MailMessage;
use icecream_directory_backend::models::{EventRegistration, EventTiming, NewRegistration};
use icecream_directory_backend::services::event::MarketingRequest;
use icecream_directory_backend::services::EventService;
use icecream_directory_backend::AppState;
use serde_json::json;
use uuid::Uuid;

use common::{seed_event, state_with, test_state, FailingMailer};

fn event_service(state: &AppState) -> EventService {
    EventService::new(state.gateway.clone(), state.notifications.clone())
}

fn registration(name: &str, email: &str) -> NewRegistration {
    NewRegistration {
        name: name.to_string(),
        email: email.to_string(),
    }
}

#[tokio::test]
async fn test_two_registrations_both_persist() {
    let (state, mailer) = test_state();
    let service = event_service(&state);
    let event = seed_event(&state.gateway, "Sundae Social", 7).await;

    let first = service
        .register(event.id, registration("Avery", "avery@example.com"), None)
        .await
        .unwrap();
    let second = service
        .register(event.id, registration("Blake", "blake@example.com"), None)
        .await
        .unwrap();

    assert!(first.confirmation.await.unwrap());
    assert!(second.confirmation.await.unwrap());
    assert_eq!(service.registration_count(event.id).await.unwrap(), 2);

    let detail = service.detail(event.id).await.unwrap();
    assert_eq!(detail.registration_count, 2);
    assert_eq!(detail.timing, EventTiming::Upcoming);

    let messages = mailer.messages();
    assert_eq!(messages.len(), 2);
    match &messages[0] {
        MailMessage::EventRegistration(mail) => {
            assert_eq!(mail.event_title, "Sundae Social");
            assert_eq!(mail.event_location, "Millennium Park");
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[tokio::test]
async fn test_upcoming_hides_past_events() {
    let (state, _) = test_state();
    let service = event_service(&state);
    seed_event(&state.gateway, "Future", 30).await;
    seed_event(&state.gateway, "Past", -30).await;
    seed_event(&state.gateway, "Soon", 2).await;

    let upcoming: Vec<String> = service
        .upcoming()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(upcoming, vec!["Soon", "Future"]);

    // the full list still carries past events for registration views
    assert_eq!(service.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_failing_mailer_keeps_registration() {
    let state = state_with(Arc::new(FailingMailer));
    let service = event_service(&state);
    let event = seed_event(&state.gateway, "Cone Crawl", 3).await;

    let registered = service
        .register(event.id, registration("Avery", "avery@example.com"), None)
        .await
        .unwrap();

    assert!(!registered.confirmation.await.unwrap());
    assert_eq!(service.registration_count(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_registration_for_missing_event_is_not_found() {
    let (state, _) = test_state();
    let service = event_service(&state);

    let result = service
        .register(Uuid::new_v4(), registration("Avery", "avery@example.com"), None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_registrations_export_csv() {
    let (state, _) = test_state();
    let service = event_service(&state);
    let event = seed_event(&state.gateway, "Sundae Social", 7).await;
    let user_id = Uuid::new_v4();
    service
        .register(event.id, registration("Avery", "avery@example.com"), Some(user_id))
        .await
        .unwrap();

    let csv = service.export_registrations(Some(event.id), None).await.unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Name,Email,Event,Event Date,Registration Date")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("Avery,avery@example.com,Sundae Social,"));

    let rows = service
        .list_registrations(None, Some("AVERY"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].registration.user_id, Some(user_id));
}

#[tokio::test]
async fn test_marketing_dedupes_and_personalizes() {
    let (state, mailer) = test_state();
    let service = event_service(&state);
    let event = seed_event(&state.gateway, "Sundae Social", 7).await;
    for (name, email) in [("Avery", "avery@example.com"), ("Avery Again", "AVERY@example.com")] {
        let registered = service
            .register(event.id, registration(name, email), None)
            .await
            .unwrap();
        registered.confirmation.await.unwrap();
    }
    // imported registrations may carry no name
    state
        .gateway
        .create::<EventRegistration, _>(&json!({
            "event_id": event.id,
            "name": "",
            "email": "anon@example.com",
        }))
        .await
        .unwrap();
    let before = mailer.messages().len();

    let request = MarketingRequest {
        subject: "See you there, {name}".to_string(),
        content: "Hi {name}, bring a friend!".to_string(),
    };
    let report = service.send_marketing(event.id, &request).await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 0);

    let marketing: Vec<_> = mailer.messages().into_iter().skip(before).collect();
    let contents: Vec<String> = marketing
        .iter()
        .filter_map(|m| match m {
            MailMessage::EventMarketing(mail) => Some(mail.content.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        contents,
        vec!["Hi Avery, bring a friend!", "Hi there, bring a friend!"]
    );
}

#[tokio::test]
async fn test_marketing_counts_failures() {
    let state = state_with(Arc::new(FailingMailer));
    let service = event_service(&state);
    let event = seed_event(&state.gateway, "Cone Crawl", 3).await;
    service
        .register(event.id, registration("Avery", "avery@example.com"), None)
        .await
        .unwrap();

    let request = MarketingRequest {
        subject: "Reminder".to_string(),
        content: "Tomorrow!".to_string(),
    };
    let report = service.send_marketing(event.id, &request).await.unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(report.failed, 1);
}
