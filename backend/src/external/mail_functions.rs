//! Client for the hosted mail functions
//!
//! Three serverless functions send transactional mail on our behalf:
//! `send-event-registration`, `send-shop-notification` and
//! `send-event-marketing`. Each takes a JSON body and a bearer key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

// ============================================================================
// Payloads
// ============================================================================

/// Confirmation sent to a new event registrant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRegistrationMail {
    pub name: String,
    pub email: String,
    pub event_title: String,
    pub event_date: String,
    pub event_location: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    NewShop,
    ShopUpdate,
}

/// Admin alert plus submitter confirmation for a shop submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShopSubmissionMail {
    pub business_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub submission_type: SubmissionType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// Promotional mail for an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventMarketingMail {
    pub recipients: Vec<Recipient>,
    pub subject: String,
    pub content: String,
    pub event_id: Uuid,
}

/// Any message the mail functions accept
#[derive(Debug, Clone, PartialEq)]
pub enum MailMessage {
    EventRegistration(EventRegistrationMail),
    ShopSubmission(ShopSubmissionMail),
    EventMarketing(EventMarketingMail),
}

impl MailMessage {
    /// Name of the function that handles this message
    pub fn function_name(&self) -> &'static str {
        match self {
            MailMessage::EventRegistration(_) => "send-event-registration",
            MailMessage::ShopSubmission(_) => "send-shop-notification",
            MailMessage::EventMarketing(_) => "send-event-marketing",
        }
    }

    pub fn payload(&self) -> AppResult<serde_json::Value> {
        let value = match self {
            MailMessage::EventRegistration(m) => serde_json::to_value(m),
            MailMessage::ShopSubmission(m) => serde_json::to_value(m),
            MailMessage::EventMarketing(m) => serde_json::to_value(m),
        };
        value.map_err(|e| AppError::Internal(format!("Mail payload error: {}", e)))
    }
}

// ============================================================================
// Senders
// ============================================================================

/// Anything that can deliver a [`MailMessage`]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: &MailMessage) -> AppResult<()>;
}

/// Mail functions HTTP client
#[derive(Clone)]
pub struct MailFunctionsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MailFunctionsClient {
    /// Create a new client for the functions host at `base_url`
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn function_url(&self, function: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, function)
    }
}

#[async_trait]
impl MailSender for MailFunctionsClient {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        let function = message.function_name();
        let response = self
            .client
            .post(self.function_url(function))
            .bearer_auth(&self.api_key)
            .json(&message.payload()?)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("{}: {}", function, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "{} returned {}: {}",
                function, status, body
            )));
        }

        tracing::debug!(function, "mail function invoked");
        Ok(())
    }
}

/// Sender used when notifications are switched off
#[derive(Clone, Default)]
pub struct DisabledMailer;

#[async_trait]
impl MailSender for DisabledMailer {
    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        tracing::info!(
            function = message.function_name(),
            "notifications disabled, dropping message"
        );
        Ok(())
    }
}
