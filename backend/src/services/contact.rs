//! Contact form service

use validator::Validate;

use crate::error::AppResult;
use crate::models::{ContactInquiry, NewContactInquiry};
use crate::store::Gateway;

/// Contact service
#[derive(Clone)]
pub struct ContactService {
    gateway: Gateway,
}

impl ContactService {
    /// Create a new ContactService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn submit(&self, input: NewContactInquiry) -> AppResult<ContactInquiry> {
        input.validate()?;
        let inquiry = self.gateway.create::<ContactInquiry, _>(&input).await?;
        tracing::info!(inquiry_id = %inquiry.id, "contact inquiry received");
        Ok(inquiry)
    }
}
