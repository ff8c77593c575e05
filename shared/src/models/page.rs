//! Content pages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{Collection, Record};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Home,
    About,
    Contact,
    #[default]
    Custom,
}

/// An editable CMS page addressed by slug
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: Option<String>,
    #[serde(default)]
    pub page_type: PageType,
    #[serde(default)]
    pub is_published: bool,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Page {
    const COLLECTION: Collection = Collection::Pages;

    fn id(&self) -> Uuid {
        self.id
    }
}
