//! Content page service

use shared::validation::validate_slug;

use crate::error::{AppError, AppResult};
use crate::models::Page;
use crate::store::{Gateway, ListQuery};

/// Page service
#[derive(Clone)]
pub struct PageService {
    gateway: Gateway,
}

impl PageService {
    /// Create a new PageService instance
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Published page by slug; drafts read as not found
    pub async fn published(&self, slug: &str) -> AppResult<Page> {
        validate_slug(slug).map_err(|msg| AppError::validation("slug", msg))?;

        let query = ListQuery::new()
            .eq("slug", slug)
            .eq("is_published", true)
            .limit(1);
        self.gateway
            .list::<Page>(&query)
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Page".to_string()))
    }
}
