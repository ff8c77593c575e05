//! Shop submission workflow
//!
//! Public submissions start out pending. An admin either approves one,
//! which turns it into a pending listing, or rejects it. Both outcomes are
//! terminal.

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::mail_functions::{MailMessage, ShopSubmissionMail, SubmissionType};
use crate::models::{
    Listing, NewShopSubmission, ShopSubmission, SubmissionStatus, SubmissionStatusPatch,
};
use crate::services::notification::NotificationService;
use crate::store::{Direction, Gateway, ListQuery};

/// Submission service
#[derive(Clone)]
pub struct SubmissionService {
    gateway: Gateway,
    notifications: NotificationService,
}

/// Result of an approval
#[derive(Debug, Serialize)]
pub struct Approval {
    pub submission: ShopSubmission,
    pub listing: Listing,
}

impl SubmissionService {
    /// Create a new SubmissionService instance
    pub fn new(gateway: Gateway, notifications: NotificationService) -> Self {
        Self {
            gateway,
            notifications,
        }
    }

    /// Store a public submission and notify the admins and the submitter
    pub async fn submit(&self, input: NewShopSubmission) -> AppResult<ShopSubmission> {
        input.validate()?;
        for (field, value) in [
            ("business_name", &input.business_name),
            ("contact_name", &input.contact_name),
            ("address", &input.address),
            ("city", &input.city),
            ("state", &input.state),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(field, format!("{} is required", field)));
            }
        }

        let submission = self.gateway.create::<ShopSubmission, _>(&input).await?;
        tracing::info!(submission_id = %submission.id, "shop submission received");

        self.notifications
            .dispatch(MailMessage::ShopSubmission(ShopSubmissionMail {
                business_name: submission.business_name.clone(),
                contact_name: submission.contact_name.clone(),
                contact_email: submission.contact_email.clone(),
                address: submission.address.clone(),
                city: submission.city.clone(),
                state: submission.state.clone(),
                submission_type: SubmissionType::NewShop,
            }));

        Ok(submission)
    }

    /// Submissions newest first
    pub async fn list(
        &self,
        status: Option<SubmissionStatus>,
        search: Option<&str>,
    ) -> AppResult<Vec<ShopSubmission>> {
        let mut query = ListQuery::new().order_by("created_at", Direction::Desc);
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        let submissions = self.gateway.list::<ShopSubmission>(&query).await?;

        Ok(match search {
            Some(needle) => submissions
                .into_iter()
                .filter(|s| s.matches_search(needle))
                .collect(),
            None => submissions,
        })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ShopSubmission> {
        Ok(self.gateway.fetch::<ShopSubmission>(id).await?)
    }

    fn check_transition(
        submission: &ShopSubmission,
        next: SubmissionStatus,
    ) -> AppResult<()> {
        if submission.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::InvalidStateTransition(format!(
                "submission is {} and cannot become {}",
                submission.status, next
            )))
        }
    }

    /// Create a pending listing from the submission and mark it approved.
    ///
    /// The two writes are separate calls. If marking the submission fails,
    /// the listing is deleted again before the error is returned.
    pub async fn approve(&self, id: Uuid) -> AppResult<Approval> {
        let submission = self.gateway.fetch::<ShopSubmission>(id).await?;
        Self::check_transition(&submission, SubmissionStatus::Approved)?;

        let listing = self
            .gateway
            .create::<Listing, _>(&submission.to_listing_draft())
            .await?;

        let patch = SubmissionStatusPatch {
            status: SubmissionStatus::Approved,
        };
        let submission = match self.gateway.update::<ShopSubmission, _>(id, &patch).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Err(cleanup) = self.gateway.delete::<Listing>(listing.id).await {
                    tracing::error!(
                        submission_id = %id,
                        listing_id = %listing.id,
                        error = %cleanup,
                        "failed to remove listing after approval failed"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::info!(submission_id = %id, listing_id = %listing.id, "submission approved");
        Ok(Approval {
            submission,
            listing,
        })
    }

    pub async fn reject(&self, id: Uuid) -> AppResult<ShopSubmission> {
        let submission = self.gateway.fetch::<ShopSubmission>(id).await?;
        Self::check_transition(&submission, SubmissionStatus::Rejected)?;

        let patch = SubmissionStatusPatch {
            status: SubmissionStatus::Rejected,
        };
        let submission = self.gateway.update::<ShopSubmission, _>(id, &patch).await?;
        tracing::info!(submission_id = %id, "submission rejected");
        Ok(submission)
    }
}
