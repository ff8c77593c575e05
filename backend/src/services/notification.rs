//! Notification dispatch
//!
//! Registration confirmations and submission alerts are fire-and-forget:
//! the primary write has already committed, so a failed send is logged and
//! never propagated. Marketing blasts are awaited so the caller gets a
//! delivery tally.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::external::mail_functions::{MailMessage, MailSender};

/// Delivery tally for a marketing send
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct BlastReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Notification service wrapping the configured mail sender
#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn MailSender>,
}

impl NotificationService {
    pub fn new(mailer: Arc<dyn MailSender>) -> Self {
        Self { mailer }
    }

    /// Send in the background. The handle resolves to whether delivery
    /// succeeded; callers are free to drop it.
    pub fn dispatch(&self, message: MailMessage) -> JoinHandle<bool> {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            match mailer.send(&message).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        function = message.function_name(),
                        error = %e,
                        "notification failed"
                    );
                    false
                }
            }
        })
    }

    /// Send each message in turn and count outcomes
    pub async fn send_all(&self, messages: Vec<MailMessage>) -> BlastReport {
        let mut report = BlastReport {
            total: messages.len(),
            ..Default::default()
        };
        for message in &messages {
            match self.mailer.send(message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    tracing::warn!(
                        function = message.function_name(),
                        error = %e,
                        "marketing message failed"
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }
}
